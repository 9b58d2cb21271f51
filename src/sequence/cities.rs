// City table

/// City name and its 3-letter code, used in report numbers
pub struct City {
    pub name: &'static str,
    pub code: &'static str,
}

const fn city(name: &'static str, code: &'static str) -> City {
    City { name, code }
}

/// The 81 provinces, in plate number order
pub const CITIES: [City; 81] = [
    city("Adana", "ADA"),
    city("Adıyaman", "ADY"),
    city("Afyonkarahisar", "AFY"),
    city("Ağrı", "AGR"),
    city("Amasya", "AMS"),
    city("Ankara", "ANK"),
    city("Antalya", "ANT"),
    city("Artvin", "ART"),
    city("Aydın", "AYD"),
    city("Balıkesir", "BAL"),
    city("Bilecik", "BIL"),
    city("Bingöl", "BNG"),
    city("Bitlis", "BIT"),
    city("Bolu", "BOL"),
    city("Burdur", "BRD"),
    city("Bursa", "BRS"),
    city("Çanakkale", "CAN"),
    city("Çankırı", "CNK"),
    city("Çorum", "COR"),
    city("Denizli", "DEN"),
    city("Diyarbakır", "DIY"),
    city("Edirne", "EDI"),
    city("Elazığ", "ELA"),
    city("Erzincan", "ERZ"),
    city("Erzurum", "ERM"),
    city("Eskişehir", "ESK"),
    city("Gaziantep", "GAZ"),
    city("Giresun", "GIR"),
    city("Gümüşhane", "GUM"),
    city("Hakkari", "HAK"),
    city("Hatay", "HAT"),
    city("Isparta", "ISP"),
    city("Mersin", "MER"),
    city("İstanbul", "IST"),
    city("İzmir", "IZM"),
    city("Kars", "KRS"),
    city("Kastamonu", "KAS"),
    city("Kayseri", "KAY"),
    city("Kırklareli", "KLR"),
    city("Kırşehir", "KRH"),
    city("Kocaeli", "KOC"),
    city("Konya", "KON"),
    city("Kütahya", "KUT"),
    city("Malatya", "MAL"),
    city("Manisa", "MAN"),
    city("Kahramanmaraş", "KMR"),
    city("Mardin", "MAR"),
    city("Muğla", "MUG"),
    city("Muş", "MUS"),
    city("Nevşehir", "NEV"),
    city("Niğde", "NIG"),
    city("Ordu", "ORD"),
    city("Rize", "RIZ"),
    city("Sakarya", "SAK"),
    city("Samsun", "SAM"),
    city("Siirt", "SII"),
    city("Sinop", "SIN"),
    city("Sivas", "SIV"),
    city("Tekirdağ", "TEK"),
    city("Tokat", "TOK"),
    city("Trabzon", "TRA"),
    city("Tunceli", "TUN"),
    city("Şanlıurfa", "SUR"),
    city("Uşak", "USK"),
    city("Van", "VAN"),
    city("Yozgat", "YOZ"),
    city("Zonguldak", "ZON"),
    city("Aksaray", "AKS"),
    city("Bayburt", "BAY"),
    city("Karaman", "KRM"),
    city("Kırıkkale", "KKL"),
    city("Batman", "BAT"),
    city("Şırnak", "SIR"),
    city("Bartın", "BRT"),
    city("Ardahan", "ARD"),
    city("Iğdır", "IGD"),
    city("Yalova", "YAL"),
    city("Karabük", "KRB"),
    city("Kilis", "KIL"),
    city("Osmaniye", "OSM"),
    city("Düzce", "DUZ"),
];

/// Finds the code of a city by its exact name
///
/// Surrounding whitespace is ignored, nothing else is normalized
pub fn find_city_code(name: &str) -> Option<&'static str> {
    let name = name.trim();

    CITIES.iter().find(|c| c.name == name).map(|c| c.code)
}

// Tests
