//! Settings that change how the database schema is created.

use clap::ValueEnum;

/// The scope in which customer phone numbers must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PhoneUniqueness {
    /// Two customers of the same user cannot share a phone number, but
    /// customers of different users can.
    #[default]
    PerUser,
    /// No two customers may share a phone number, regardless of owner.
    Global,
}

impl PhoneUniqueness {
    /// The name of the unique index that enforces this setting.
    pub(crate) fn index_name(&self) -> &'static str {
        match self {
            PhoneUniqueness::PerUser => "idx_customer_user_phone",
            PhoneUniqueness::Global => "idx_customer_phone",
        }
    }

    /// The columns covered by the unique index.
    pub(crate) fn index_columns(&self) -> &'static str {
        match self {
            PhoneUniqueness::PerUser => "user_id, phone",
            PhoneUniqueness::Global => "phone",
        }
    }

    /// The other setting, whose index must be dropped when switching.
    pub(crate) fn other(&self) -> Self {
        match self {
            PhoneUniqueness::PerUser => PhoneUniqueness::Global,
            PhoneUniqueness::Global => PhoneUniqueness::PerUser,
        }
    }
}
