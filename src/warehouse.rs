use crate::order::Order;
use log::info;

pub trait Warehouse {
    fn name(&self) -> &'static str;

    fn ship(&self, order: &Order) {
        info!(
            "shipping order {} to {} from {} warehouse",
            order.id,
            order.address.city,
            self.name()
        );
    }
}

pub struct AlbertaWarehouse;
pub struct BritishColumbiaWarehouse;
pub struct OntarioWarehouse;
pub struct QuebecWarehouse;

impl Warehouse for AlbertaWarehouse {
    fn name(&self) -> &'static str {
        "Alberta"
    }
}

impl Warehouse for BritishColumbiaWarehouse {
    fn name(&self) -> &'static str {
        "British Columbia"
    }
}

impl Warehouse for OntarioWarehouse {
    fn name(&self) -> &'static str {
        "Ontario"
    }
}

impl Warehouse for QuebecWarehouse {
    fn name(&self) -> &'static str {
        "Quebec"
    }
}

const PROVINCES: &[(&str, &str)] = &[
    ("AB", "alberta"),
    ("BC", "british columbia"),
    ("MB", "manitoba"),
    ("NB", "new brunswick"),
    ("NL", "newfoundland and labrador"),
    ("NS", "nova scotia"),
    ("NT", "northwest territories"),
    ("NU", "nunavut"),
    ("ON", "ontario"),
    ("PE", "prince edward island"),
    ("QC", "quebec"),
    ("SK", "saskatchewan"),
    ("YT", "yukon"),
];

/// Normalizes a province name or code to its two-letter code.
pub fn province_code(province: &str) -> Option<&'static str> {
    let province = province.trim();
    PROVINCES
        .iter()
        .find(|(code, name)| code.eq_ignore_ascii_case(province) || name.eq_ignore_ascii_case(province))
        .map(|(code, _)| *code)
}

pub struct WarehouseRouter {
    alberta: AlbertaWarehouse,
    british_columbia: BritishColumbiaWarehouse,
    ontario: OntarioWarehouse,
    quebec: QuebecWarehouse,
}

impl Default for WarehouseRouter {
    fn default() -> Self {
        WarehouseRouter {
            alberta: AlbertaWarehouse,
            british_columbia: BritishColumbiaWarehouse,
            ontario: OntarioWarehouse,
            quebec: QuebecWarehouse,
        }
    }
}

impl WarehouseRouter {
    /// Picks the warehouse serving `province`. Unknown provinces are served
    /// from Ontario.
    pub fn route(&self, province: &str) -> &dyn Warehouse {
        match province_code(province) {
            Some("AB") | Some("SK") | Some("MB") | Some("NT") => &self.alberta,
            Some("BC") | Some("YT") => &self.british_columbia,
            Some("QC") | Some("NB") | Some("NS") | Some("PE") | Some("NL") => &self.quebec,
            _ => &self.ontario,
        }
    }

    pub fn dispatch(&self, order: &Order) -> &'static str {
        let warehouse = self.route(&order.address.province);
        warehouse.ship(order);
        warehouse.name()
    }
}
