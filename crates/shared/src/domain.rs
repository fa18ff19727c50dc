use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! named_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum!(SchemaKey {
    SignUp => "signUp",
    ChangePassword => "changePassword",
});

named_enum!(Operation {
    SignUp => "signUp",
    ChangeUserPassword => "changeUserPassword",
});

named_enum!(PageId {
    MyOrganisations => "MyOrganisations",
    UpdateProfile => "UpdateProfile",
    CreateOrganisation => "CreateOrganisation",
    UpdatePassword => "UpdatePassword",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitKind {
    SignUp,
    NewPassword,
}

impl SubmitKind {
    /// Maps a view-level trigger name to a kind. Unknown triggers submit as
    /// [`SubmitKind::SignUp`].
    pub fn from_trigger(trigger: &str) -> Self {
        match trigger {
            "NEW_PASSWORD" => Self::NewPassword,
            _ => Self::SignUp,
        }
    }

    pub fn schema_key(self) -> SchemaKey {
        match self {
            Self::SignUp => SchemaKey::SignUp,
            Self::NewPassword => SchemaKey::ChangePassword,
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Self::SignUp => Operation::SignUp,
            Self::NewPassword => Operation::ChangeUserPassword,
        }
    }

    pub fn carries_redirect(self) -> bool {
        matches!(self, Self::SignUp)
    }
}

pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";
    pub const REDIRECT_URL: &str = "redirectURL";

    pub const AUTHENTICATION: &[&str] = &[
        FIRST_NAME,
        LAST_NAME,
        EMAIL,
        USERNAME,
        PASSWORD,
        CONFIRM_PASSWORD,
    ];
}
