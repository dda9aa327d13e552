use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Mobile-money service handled by the kiosk.
///
/// The set is closed: these are the three networks operating in Madagascar
/// and the kiosk holds one float balance per service. There is no dynamic
/// registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Mvola,
    OrangeMoney,
    AirtelMoney,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [
        ServiceKind::Mvola,
        ServiceKind::OrangeMoney,
        ServiceKind::AirtelMoney,
    ];

    /// Canonical wire/database name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mvola => "mvola",
            Self::OrangeMoney => "orange_money",
            Self::AirtelMoney => "airtel_money",
        }
    }

    /// Human-readable service label, used in operator-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mvola => "MVola",
            Self::OrangeMoney => "Orange Money",
            Self::AirtelMoney => "Airtel Money",
        }
    }
}

impl core::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for ServiceKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "mvola" => Ok(Self::Mvola),
            "orange_money" => Ok(Self::OrangeMoney),
            "airtel_money" => Ok(Self::AirtelMoney),
            other => Err(EngineError::KeyNotFound(format!(
                "unknown service: {other}"
            ))),
        }
    }
}
