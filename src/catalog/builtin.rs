use crate::types::Category;

/// (term, category, reason, base revenue, base confidence)
pub(super) type RawTerm = (&'static str, Category, &'static str, f64, u8);

pub(super) const BUILTIN_TERMS: &[RawTerm] = &[
    // Products
    ("coffee", Category::Product, "CPG category; high advertiser demand", 5000.0, 85),
    ("laptop", Category::Product, "Tech product; premium sponsorship potential", 8000.0, 90),
    ("smartphone", Category::Product, "Tech product; high-value category", 10000.0, 92),
    ("phone", Category::Product, "Tech product; high-value category", 9000.0, 88),
    ("car", Category::Product, "Automotive; premium sponsorship", 15000.0, 88),
    ("vehicle", Category::Product, "Automotive; premium sponsorship", 14000.0, 86),
    ("watch", Category::Product, "Luxury goods; high-value placement", 12000.0, 89),
    ("sneakers", Category::Product, "Fashion/athletic; strong brand partnerships", 7000.0, 84),
    ("shoes", Category::Product, "Fashion/athletic; strong brand partnerships", 6500.0, 82),
    ("beer", Category::Product, "Beverage; established product placement", 8500.0, 87),
    ("wine", Category::Product, "Beverage; premium brand opportunities", 7500.0, 85),
    ("soda", Category::Product, "Beverage; major brand category", 6000.0, 86),
    // Environments
    ("kitchen", Category::Environment, "Home setting; appliance/food brands", 6000.0, 80),
    ("office", Category::Environment, "Workplace setting; B2B opportunities", 7000.0, 82),
    ("gym", Category::Environment, "Fitness setting; health/wellness brands", 6500.0, 85),
    ("restaurant", Category::Environment, "Dining setting; food/beverage brands", 5500.0, 83),
    ("cafe", Category::Environment, "Dining setting; food/beverage brands", 5000.0, 81),
    ("store", Category::Environment, "Retail setting; multiple brand categories", 7500.0, 84),
    ("mall", Category::Environment, "Retail setting; multiple brand categories", 8000.0, 85),
    ("airport", Category::Environment, "Travel setting; premium brand opportunities", 9000.0, 86),
    ("hotel", Category::Environment, "Hospitality setting; luxury brand placement", 8500.0, 84),
    // Situations
    ("wedding", Category::Situation, "Life event; multiple brand categories", 9000.0, 87),
    ("travel", Category::Situation, "Tourism/hospitality opportunities", 8500.0, 86),
    ("vacation", Category::Situation, "Tourism/hospitality opportunities", 8000.0, 85),
    ("party", Category::Situation, "Social event; food/beverage/entertainment", 6000.0, 82),
    ("meeting", Category::Situation, "Business setting; B2B opportunities", 5500.0, 80),
    ("date", Category::Situation, "Social setting; lifestyle brands", 5000.0, 79),
    ("shopping", Category::Situation, "Retail activity; multiple brand categories", 7000.0, 83),
    // Thematic
    ("luxury", Category::Thematic, "Premium lifestyle; high-value brands", 10000.0, 88),
    ("technology", Category::Thematic, "Tech theme; innovation-focused brands", 9500.0, 87),
    ("fashion", Category::Thematic, "Style theme; apparel/accessory brands", 8000.0, 85),
    ("fitness", Category::Thematic, "Health theme; wellness brands", 7500.0, 84),
    ("adventure", Category::Thematic, "Action theme; outdoor/travel brands", 8500.0, 86),
];
