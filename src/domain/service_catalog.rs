use super::{Price, ServiceCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOption {
    pub id: &'static str,
    pub category: ServiceCategory,
    pub label: &'static str,
    pub base_price: Price,
    pub description: &'static str,
}

const SNOW_OPTIONS: [ServiceOption; 3] = [
    ServiceOption {
        id: "snow-driveway",
        category: ServiceCategory::Snow,
        label: "Driveway Only",
        base_price: Price::catalog(4000),
        description: "Clearance of main driveway area.",
    },
    ServiceOption {
        id: "snow-full",
        category: ServiceCategory::Snow,
        label: "Driveway + Walkway",
        base_price: Price::catalog(6000),
        description: "Includes front steps and walkway to door.",
    },
    ServiceOption {
        id: "snow-salt",
        category: ServiceCategory::Snow,
        label: "Salting Add-on",
        base_price: Price::catalog(1500),
        description: "Application of eco-friendly de-icer.",
    },
];

const LAWN_OPTIONS: [ServiceOption; 3] = [
    ServiceOption {
        id: "lawn-mow",
        category: ServiceCategory::Lawn,
        label: "Standard Mow",
        base_price: Price::catalog(5000),
        description: "Mowing and grass clipping removal.",
    },
    ServiceOption {
        id: "lawn-edge",
        category: ServiceCategory::Lawn,
        label: "Mow & Edge",
        base_price: Price::catalog(7000),
        description: "Standard mow plus precision edging.",
    },
    ServiceOption {
        id: "lawn-full",
        category: ServiceCategory::Lawn,
        label: "Full Care",
        base_price: Price::catalog(10000),
        description: "Mow, edge, and hedge trimming.",
    },
];

pub fn service_options(category: ServiceCategory) -> &'static [ServiceOption] {
    match category {
        ServiceCategory::Snow => &SNOW_OPTIONS,
        ServiceCategory::Lawn => &LAWN_OPTIONS,
    }
}

pub fn find_service_option(category: ServiceCategory, id: &str) -> Option<&'static ServiceOption> {
    service_options(category).iter().find(|o| o.id == id)
}
