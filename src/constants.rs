pub mod roles {

    pub const ADMIN: &str = "admin";

    pub const MODERATOR: &str = "moderator";

    pub const MEMBER: &str = "member";

    pub const ALL: &[&str] = &[ADMIN, MODERATOR, MEMBER];
}

pub mod roster {

    pub mod category {

        pub const CIVILIAN: &str = "civilian";

        pub const MEMBER: &str = "member";

        pub const ALL: &[&str] = &[CIVILIAN, MEMBER];
    }

    pub mod status {

        pub const ACTIVE: &str = "active";

        pub const ON_LEAVE: &str = "on_leave";

        pub const INACTIVE: &str = "inactive";

        pub const ALL: &[&str] = &[ACTIVE, ON_LEAVE, INACTIVE];
    }
}

pub mod retention {

    pub const DEFAULT_ACTIVITY_LOG_DAYS: i64 = 90;
}
