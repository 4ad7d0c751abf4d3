//! Built-in ISO 3166-1 country table with fuzzy name search.
//!
//! Resolution order for a query: alpha-2/alpha-3 code → exact name, official
//! name or alias → substring → edit distance ≤ 2. All comparisons are
//! case-insensitive. Ties go to the first table entry.

use super::types::CountryInfo;
use crate::error::ServiceError;

/// Resolves a free-text country name to its canonical ISO entry.
pub trait CountryLookup {
    fn lookup(&self, name: &str) -> Result<CountryInfo, ServiceError>;
}

struct BuiltinCountry {
    alpha_2: &'static str,
    alpha_3: &'static str,
    name: &'static str,
    official_name: Option<&'static str>,
}

macro_rules! country {
    ($a2:literal, $a3:literal, $name:literal) => {
        BuiltinCountry { alpha_2: $a2, alpha_3: $a3, name: $name, official_name: None }
    };
    ($a2:literal, $a3:literal, $name:literal, $official:literal) => {
        BuiltinCountry { alpha_2: $a2, alpha_3: $a3, name: $name, official_name: Some($official) }
    };
}

const BUILTIN_COUNTRIES: &[BuiltinCountry] = &[
    country!("AW", "ABW", "Aruba"),
    country!("AF", "AFG", "Afghanistan", "Islamic Republic of Afghanistan"),
    country!("AO", "AGO", "Angola", "Republic of Angola"),
    country!("AI", "AIA", "Anguilla"),
    country!("AX", "ALA", "Åland Islands"),
    country!("AL", "ALB", "Albania", "Republic of Albania"),
    country!("AD", "AND", "Andorra", "Principality of Andorra"),
    country!("AE", "ARE", "United Arab Emirates"),
    country!("AR", "ARG", "Argentina", "Argentine Republic"),
    country!("AM", "ARM", "Armenia", "Republic of Armenia"),
    country!("AS", "ASM", "American Samoa"),
    country!("AQ", "ATA", "Antarctica"),
    country!("TF", "ATF", "French Southern Territories"),
    country!("AG", "ATG", "Antigua and Barbuda"),
    country!("AU", "AUS", "Australia"),
    country!("AT", "AUT", "Austria", "Republic of Austria"),
    country!("AZ", "AZE", "Azerbaijan", "Republic of Azerbaijan"),
    country!("BI", "BDI", "Burundi", "Republic of Burundi"),
    country!("BE", "BEL", "Belgium", "Kingdom of Belgium"),
    country!("BJ", "BEN", "Benin", "Republic of Benin"),
    country!("BQ", "BES", "Bonaire, Sint Eustatius and Saba"),
    country!("BF", "BFA", "Burkina Faso"),
    country!("BD", "BGD", "Bangladesh", "People's Republic of Bangladesh"),
    country!("BG", "BGR", "Bulgaria", "Republic of Bulgaria"),
    country!("BH", "BHR", "Bahrain", "Kingdom of Bahrain"),
    country!("BS", "BHS", "Bahamas", "Commonwealth of the Bahamas"),
    country!("BA", "BIH", "Bosnia and Herzegovina", "Republic of Bosnia and Herzegovina"),
    country!("BL", "BLM", "Saint Barthélemy"),
    country!("BY", "BLR", "Belarus", "Republic of Belarus"),
    country!("BZ", "BLZ", "Belize"),
    country!("BM", "BMU", "Bermuda"),
    country!("BO", "BOL", "Bolivia, Plurinational State of", "Plurinational State of Bolivia"),
    country!("BR", "BRA", "Brazil", "Federative Republic of Brazil"),
    country!("BB", "BRB", "Barbados"),
    country!("BN", "BRN", "Brunei Darussalam"),
    country!("BT", "BTN", "Bhutan", "Kingdom of Bhutan"),
    country!("BV", "BVT", "Bouvet Island"),
    country!("BW", "BWA", "Botswana", "Republic of Botswana"),
    country!("CF", "CAF", "Central African Republic"),
    country!("CA", "CAN", "Canada"),
    country!("CC", "CCK", "Cocos (Keeling) Islands"),
    country!("CH", "CHE", "Switzerland", "Swiss Confederation"),
    country!("CL", "CHL", "Chile", "Republic of Chile"),
    country!("CN", "CHN", "China", "People's Republic of China"),
    country!("CI", "CIV", "Côte d'Ivoire", "Republic of Côte d'Ivoire"),
    country!("CM", "CMR", "Cameroon", "Republic of Cameroon"),
    country!("CD", "COD", "Congo, The Democratic Republic of the"),
    country!("CG", "COG", "Congo", "Republic of the Congo"),
    country!("CK", "COK", "Cook Islands"),
    country!("CO", "COL", "Colombia", "Republic of Colombia"),
    country!("KM", "COM", "Comoros", "Union of the Comoros"),
    country!("CV", "CPV", "Cabo Verde", "Republic of Cabo Verde"),
    country!("CR", "CRI", "Costa Rica", "Republic of Costa Rica"),
    country!("CU", "CUB", "Cuba", "Republic of Cuba"),
    country!("CW", "CUW", "Curaçao"),
    country!("CX", "CXR", "Christmas Island"),
    country!("KY", "CYM", "Cayman Islands"),
    country!("CY", "CYP", "Cyprus", "Republic of Cyprus"),
    country!("CZ", "CZE", "Czechia", "Czech Republic"),
    country!("DE", "DEU", "Germany", "Federal Republic of Germany"),
    country!("DJ", "DJI", "Djibouti", "Republic of Djibouti"),
    country!("DM", "DMA", "Dominica", "Commonwealth of Dominica"),
    country!("DK", "DNK", "Denmark", "Kingdom of Denmark"),
    country!("DO", "DOM", "Dominican Republic"),
    country!("DZ", "DZA", "Algeria", "People's Democratic Republic of Algeria"),
    country!("EC", "ECU", "Ecuador", "Republic of Ecuador"),
    country!("EG", "EGY", "Egypt", "Arab Republic of Egypt"),
    country!("ER", "ERI", "Eritrea", "the State of Eritrea"),
    country!("EH", "ESH", "Western Sahara"),
    country!("ES", "ESP", "Spain", "Kingdom of Spain"),
    country!("EE", "EST", "Estonia", "Republic of Estonia"),
    country!("ET", "ETH", "Ethiopia", "Federal Democratic Republic of Ethiopia"),
    country!("FI", "FIN", "Finland", "Republic of Finland"),
    country!("FJ", "FJI", "Fiji", "Republic of Fiji"),
    country!("FK", "FLK", "Falkland Islands (Malvinas)"),
    country!("FR", "FRA", "France", "French Republic"),
    country!("FO", "FRO", "Faroe Islands"),
    country!("FM", "FSM", "Micronesia, Federated States of", "Federated States of Micronesia"),
    country!("GA", "GAB", "Gabon", "Gabonese Republic"),
    country!("GB", "GBR", "United Kingdom", "United Kingdom of Great Britain and Northern Ireland"),
    country!("GE", "GEO", "Georgia"),
    country!("GG", "GGY", "Guernsey"),
    country!("GH", "GHA", "Ghana", "Republic of Ghana"),
    country!("GI", "GIB", "Gibraltar"),
    country!("GN", "GIN", "Guinea", "Republic of Guinea"),
    country!("GP", "GLP", "Guadeloupe"),
    country!("GM", "GMB", "Gambia", "Republic of the Gambia"),
    country!("GW", "GNB", "Guinea-Bissau", "Republic of Guinea-Bissau"),
    country!("GQ", "GNQ", "Equatorial Guinea", "Republic of Equatorial Guinea"),
    country!("GR", "GRC", "Greece", "Hellenic Republic"),
    country!("GD", "GRD", "Grenada"),
    country!("GL", "GRL", "Greenland"),
    country!("GT", "GTM", "Guatemala", "Republic of Guatemala"),
    country!("GF", "GUF", "French Guiana"),
    country!("GU", "GUM", "Guam"),
    country!("GY", "GUY", "Guyana", "Republic of Guyana"),
    country!("HK", "HKG", "Hong Kong", "Hong Kong Special Administrative Region of China"),
    country!("HM", "HMD", "Heard Island and McDonald Islands"),
    country!("HN", "HND", "Honduras", "Republic of Honduras"),
    country!("HR", "HRV", "Croatia", "Republic of Croatia"),
    country!("HT", "HTI", "Haiti", "Republic of Haiti"),
    country!("HU", "HUN", "Hungary"),
    country!("ID", "IDN", "Indonesia", "Republic of Indonesia"),
    country!("IM", "IMN", "Isle of Man"),
    country!("IN", "IND", "India", "Republic of India"),
    country!("IO", "IOT", "British Indian Ocean Territory"),
    country!("IE", "IRL", "Ireland"),
    country!("IR", "IRN", "Iran, Islamic Republic of", "Islamic Republic of Iran"),
    country!("IQ", "IRQ", "Iraq", "Republic of Iraq"),
    country!("IS", "ISL", "Iceland", "Republic of Iceland"),
    country!("IL", "ISR", "Israel", "State of Israel"),
    country!("IT", "ITA", "Italy", "Italian Republic"),
    country!("JM", "JAM", "Jamaica"),
    country!("JE", "JEY", "Jersey"),
    country!("JO", "JOR", "Jordan", "Hashemite Kingdom of Jordan"),
    country!("JP", "JPN", "Japan"),
    country!("KZ", "KAZ", "Kazakhstan", "Republic of Kazakhstan"),
    country!("KE", "KEN", "Kenya", "Republic of Kenya"),
    country!("KG", "KGZ", "Kyrgyzstan", "Kyrgyz Republic"),
    country!("KH", "KHM", "Cambodia", "Kingdom of Cambodia"),
    country!("KI", "KIR", "Kiribati", "Republic of Kiribati"),
    country!("KN", "KNA", "Saint Kitts and Nevis"),
    country!("KR", "KOR", "Korea, Republic of"),
    country!("KW", "KWT", "Kuwait", "State of Kuwait"),
    country!("LA", "LAO", "Lao People's Democratic Republic"),
    country!("LB", "LBN", "Lebanon", "Lebanese Republic"),
    country!("LR", "LBR", "Liberia", "Republic of Liberia"),
    country!("LY", "LBY", "Libya"),
    country!("LC", "LCA", "Saint Lucia"),
    country!("LI", "LIE", "Liechtenstein", "Principality of Liechtenstein"),
    country!("LK", "LKA", "Sri Lanka", "Democratic Socialist Republic of Sri Lanka"),
    country!("LS", "LSO", "Lesotho", "Kingdom of Lesotho"),
    country!("LT", "LTU", "Lithuania", "Republic of Lithuania"),
    country!("LU", "LUX", "Luxembourg", "Grand Duchy of Luxembourg"),
    country!("LV", "LVA", "Latvia", "Republic of Latvia"),
    country!("MO", "MAC", "Macao", "Macao Special Administrative Region of China"),
    country!("MF", "MAF", "Saint Martin (French part)"),
    country!("MA", "MAR", "Morocco", "Kingdom of Morocco"),
    country!("MC", "MCO", "Monaco", "Principality of Monaco"),
    country!("MD", "MDA", "Moldova, Republic of", "Republic of Moldova"),
    country!("MG", "MDG", "Madagascar", "Republic of Madagascar"),
    country!("MV", "MDV", "Maldives", "Republic of Maldives"),
    country!("MX", "MEX", "Mexico", "United Mexican States"),
    country!("MH", "MHL", "Marshall Islands", "Republic of the Marshall Islands"),
    country!("MK", "MKD", "North Macedonia", "Republic of North Macedonia"),
    country!("ML", "MLI", "Mali", "Republic of Mali"),
    country!("MT", "MLT", "Malta", "Republic of Malta"),
    country!("MM", "MMR", "Myanmar", "Republic of Myanmar"),
    country!("ME", "MNE", "Montenegro"),
    country!("MN", "MNG", "Mongolia"),
    country!(
        "MP",
        "MNP",
        "Northern Mariana Islands",
        "Commonwealth of the Northern Mariana Islands"
    ),
    country!("MZ", "MOZ", "Mozambique", "Republic of Mozambique"),
    country!("MR", "MRT", "Mauritania", "Islamic Republic of Mauritania"),
    country!("MS", "MSR", "Montserrat"),
    country!("MQ", "MTQ", "Martinique"),
    country!("MU", "MUS", "Mauritius", "Republic of Mauritius"),
    country!("MW", "MWI", "Malawi", "Republic of Malawi"),
    country!("MY", "MYS", "Malaysia"),
    country!("YT", "MYT", "Mayotte"),
    country!("NA", "NAM", "Namibia", "Republic of Namibia"),
    country!("NC", "NCL", "New Caledonia"),
    country!("NE", "NER", "Niger", "Republic of the Niger"),
    country!("NF", "NFK", "Norfolk Island"),
    country!("NG", "NGA", "Nigeria", "Federal Republic of Nigeria"),
    country!("NI", "NIC", "Nicaragua", "Republic of Nicaragua"),
    country!("NU", "NIU", "Niue"),
    country!("NL", "NLD", "Netherlands", "Kingdom of the Netherlands"),
    country!("NO", "NOR", "Norway", "Kingdom of Norway"),
    country!("NP", "NPL", "Nepal", "Federal Democratic Republic of Nepal"),
    country!("NR", "NRU", "Nauru", "Republic of Nauru"),
    country!("NZ", "NZL", "New Zealand"),
    country!("OM", "OMN", "Oman", "Sultanate of Oman"),
    country!("PK", "PAK", "Pakistan", "Islamic Republic of Pakistan"),
    country!("PA", "PAN", "Panama", "Republic of Panama"),
    country!("PN", "PCN", "Pitcairn"),
    country!("PE", "PER", "Peru", "Republic of Peru"),
    country!("PH", "PHL", "Philippines", "Republic of the Philippines"),
    country!("PW", "PLW", "Palau", "Republic of Palau"),
    country!("PG", "PNG", "Papua New Guinea", "Independent State of Papua New Guinea"),
    country!("PL", "POL", "Poland", "Republic of Poland"),
    country!("PR", "PRI", "Puerto Rico"),
    country!(
        "KP",
        "PRK",
        "Korea, Democratic People's Republic of",
        "Democratic People's Republic of Korea"
    ),
    country!("PT", "PRT", "Portugal", "Portuguese Republic"),
    country!("PY", "PRY", "Paraguay", "Republic of Paraguay"),
    country!("PS", "PSE", "Palestine, State of", "the State of Palestine"),
    country!("PF", "PYF", "French Polynesia"),
    country!("QA", "QAT", "Qatar", "State of Qatar"),
    country!("RE", "REU", "Réunion"),
    country!("RO", "ROU", "Romania"),
    country!("RU", "RUS", "Russian Federation"),
    country!("RW", "RWA", "Rwanda", "Rwandese Republic"),
    country!("SA", "SAU", "Saudi Arabia", "Kingdom of Saudi Arabia"),
    country!("SD", "SDN", "Sudan", "Republic of the Sudan"),
    country!("SN", "SEN", "Senegal", "Republic of Senegal"),
    country!("SG", "SGP", "Singapore", "Republic of Singapore"),
    country!("GS", "SGS", "South Georgia and the South Sandwich Islands"),
    country!("SH", "SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    country!("SJ", "SJM", "Svalbard and Jan Mayen"),
    country!("SB", "SLB", "Solomon Islands"),
    country!("SL", "SLE", "Sierra Leone", "Republic of Sierra Leone"),
    country!("SV", "SLV", "El Salvador", "Republic of El Salvador"),
    country!("SM", "SMR", "San Marino", "Republic of San Marino"),
    country!("SO", "SOM", "Somalia", "Federal Republic of Somalia"),
    country!("PM", "SPM", "Saint Pierre and Miquelon"),
    country!("RS", "SRB", "Serbia", "Republic of Serbia"),
    country!("SS", "SSD", "South Sudan", "Republic of South Sudan"),
    country!("ST", "STP", "Sao Tome and Principe", "Democratic Republic of Sao Tome and Principe"),
    country!("SR", "SUR", "Suriname", "Republic of Suriname"),
    country!("SK", "SVK", "Slovakia", "Slovak Republic"),
    country!("SI", "SVN", "Slovenia", "Republic of Slovenia"),
    country!("SE", "SWE", "Sweden", "Kingdom of Sweden"),
    country!("SZ", "SWZ", "Eswatini", "Kingdom of Eswatini"),
    country!("SX", "SXM", "Sint Maarten (Dutch part)"),
    country!("SC", "SYC", "Seychelles", "Republic of Seychelles"),
    country!("SY", "SYR", "Syrian Arab Republic"),
    country!("TC", "TCA", "Turks and Caicos Islands"),
    country!("TD", "TCD", "Chad", "Republic of Chad"),
    country!("TG", "TGO", "Togo", "Togolese Republic"),
    country!("TH", "THA", "Thailand", "Kingdom of Thailand"),
    country!("TJ", "TJK", "Tajikistan", "Republic of Tajikistan"),
    country!("TK", "TKL", "Tokelau"),
    country!("TM", "TKM", "Turkmenistan"),
    country!("TL", "TLS", "Timor-Leste", "Democratic Republic of Timor-Leste"),
    country!("TO", "TON", "Tonga", "Kingdom of Tonga"),
    country!("TT", "TTO", "Trinidad and Tobago", "Republic of Trinidad and Tobago"),
    country!("TN", "TUN", "Tunisia", "Republic of Tunisia"),
    country!("TR", "TUR", "Türkiye", "Republic of Türkiye"),
    country!("TV", "TUV", "Tuvalu"),
    country!("TW", "TWN", "Taiwan, Province of China", "Taiwan, Province of China"),
    country!("TZ", "TZA", "Tanzania, United Republic of", "United Republic of Tanzania"),
    country!("UG", "UGA", "Uganda", "Republic of Uganda"),
    country!("UA", "UKR", "Ukraine"),
    country!("UM", "UMI", "United States Minor Outlying Islands"),
    country!("UY", "URY", "Uruguay", "Eastern Republic of Uruguay"),
    country!("US", "USA", "United States", "United States of America"),
    country!("UZ", "UZB", "Uzbekistan", "Republic of Uzbekistan"),
    country!("VA", "VAT", "Holy See (Vatican City State)"),
    country!("VC", "VCT", "Saint Vincent and the Grenadines"),
    country!("VE", "VEN", "Venezuela, Bolivarian Republic of", "Bolivarian Republic of Venezuela"),
    country!("VG", "VGB", "Virgin Islands, British", "British Virgin Islands"),
    country!("VI", "VIR", "Virgin Islands, U.S.", "Virgin Islands of the United States"),
    country!("VN", "VNM", "Viet Nam", "Socialist Republic of Viet Nam"),
    country!("VU", "VUT", "Vanuatu", "Republic of Vanuatu"),
    country!("WF", "WLF", "Wallis and Futuna"),
    country!("WS", "WSM", "Samoa", "Independent State of Samoa"),
    country!("YE", "YEM", "Yemen", "Republic of Yemen"),
    country!("ZA", "ZAF", "South Africa", "Republic of South Africa"),
    country!("ZM", "ZMB", "Zambia", "Republic of Zambia"),
    country!("ZW", "ZWE", "Zimbabwe", "Republic of Zimbabwe"),
];

/// Everyday names (as returned by geocoders or found in film datasets) that
/// differ from the ISO short name.
const ALIASES: &[(&str, &str)] = &[
    ("usa", "USA"),
    ("us", "USA"),
    ("america", "USA"),
    ("united states of america", "USA"),
    ("uk", "GBR"),
    ("great britain", "GBR"),
    ("britain", "GBR"),
    ("england", "GBR"),
    ("scotland", "GBR"),
    ("wales", "GBR"),
    ("northern ireland", "GBR"),
    ("russia", "RUS"),
    ("south korea", "KOR"),
    ("korea", "KOR"),
    ("north korea", "PRK"),
    ("iran", "IRN"),
    ("syria", "SYR"),
    ("vietnam", "VNM"),
    ("laos", "LAO"),
    ("moldova", "MDA"),
    ("bolivia", "BOL"),
    ("venezuela", "VEN"),
    ("tanzania", "TZA"),
    ("taiwan", "TWN"),
    ("turkey", "TUR"),
    ("czech republic", "CZE"),
    ("macedonia", "MKD"),
    ("burma", "MMR"),
    ("ivory coast", "CIV"),
    ("cape verde", "CPV"),
    ("swaziland", "SWZ"),
    ("east timor", "TLS"),
    ("vatican", "VAT"),
    ("vatican city", "VAT"),
    ("brunei", "BRN"),
    ("palestine", "PSE"),
    ("palestinian territory", "PSE"),
    ("micronesia", "FSM"),
    ("democratic republic of the congo", "COD"),
    ("dr congo", "COD"),
    ("republic of the congo", "COG"),
    ("the netherlands", "NLD"),
    ("holland", "NLD"),
    ("west germany", "DEU"),
    ("east germany", "DEU"),
    ("soviet union", "RUS"),
    ("ussr", "RUS"),
    ("yugoslavia", "SRB"),
    ("czechoslovakia", "CZE"),
];

/// Offline lookup over the built-in ISO 3166-1 table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCountries;

impl BuiltinCountries {
    pub fn new() -> Self {
        Self
    }

    /// Number of countries in the built-in table.
    pub fn len() -> usize {
        BUILTIN_COUNTRIES.len()
    }
}

impl CountryLookup for BuiltinCountries {
    fn lookup(&self, name: &str) -> Result<CountryInfo, ServiceError> {
        fuzzy_search(name)
            .map(to_info)
            .ok_or_else(|| ServiceError::NotFound(name.trim().to_string()))
    }
}

fn to_info(c: &BuiltinCountry) -> CountryInfo {
    CountryInfo {
        official_name: c.official_name.map(str::to_string),
        name: c.name.to_string(),
        alpha_2: c.alpha_2.to_string(),
        alpha_3: c.alpha_3.to_string(),
    }
}

fn find_by_code(code: &str) -> Option<&'static BuiltinCountry> {
    let code = code.trim();
    match code.len() {
        2 => BUILTIN_COUNTRIES
            .iter()
            .find(|c| c.alpha_2.eq_ignore_ascii_case(code)),
        3 => BUILTIN_COUNTRIES
            .iter()
            .find(|c| c.alpha_3.eq_ignore_ascii_case(code)),
        _ => None,
    }
}

fn fuzzy_search(query: &str) -> Option<&'static BuiltinCountry> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    // Codes
    if let Some(c) = find_by_code(&q) {
        return Some(c);
    }

    // Exact name / official name
    if let Some(c) = BUILTIN_COUNTRIES.iter().find(|c| {
        c.name.to_lowercase() == q || c.official_name.is_some_and(|o| o.to_lowercase() == q)
    }) {
        return Some(c);
    }

    // Aliases
    if let Some((_, code)) = ALIASES.iter().find(|(alias, _)| *alias == q) {
        return find_by_code(code);
    }

    // Substring: "Ukraine (Europe)" or "Korea" style partial names.
    // Skip very short queries, they match too much.
    if q.chars().count() >= 4 {
        if let Some(c) = BUILTIN_COUNTRIES.iter().find(|c| {
            let name = c.name.to_lowercase();
            name.contains(&q) || q.contains(&name)
        }) {
            return Some(c);
        }
    }

    // Typos
    let mut best: Option<(&BuiltinCountry, usize)> = None;
    for c in BUILTIN_COUNTRIES {
        let dist = edit_distance(&q, &c.name.to_lowercase());
        if dist <= 2 && best.map_or(true, |(_, d)| dist < d) {
            best = Some((c, dist));
        }
    }
    best.map(|(c, _)| c)
}

/// Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
