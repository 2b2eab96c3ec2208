use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    #[default]
    Home,
    Office,
    Other,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Home => "HOME",
            AddressKind::Office => "OFFICE",
            AddressKind::Other => "OTHER",
        }
    }
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HOME" => Ok(AddressKind::Home),
            "OFFICE" => Ok(AddressKind::Office),
            "OTHER" => Ok(AddressKind::Other),
            _ => Err(format!("Invalid address type: {}", s)),
        }
    }
}

/// Structured address captured while a booking is being drafted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub kind: AddressKind,
}

impl Address {
    /// The denormalized form stored on a job: `"<street>, <city>"`.
    pub fn to_line(&self) -> String {
        let street = self.street.trim();
        let city = self.city.trim();
        if city.is_empty() {
            street.to_string()
        } else {
            format!("{}, {}", street, city)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
