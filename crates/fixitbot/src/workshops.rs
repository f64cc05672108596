use serde::Serialize;

/// One curated body-shop entry of the workshop directory.
#[derive(Debug, Clone, Serialize)]
pub struct Workshop {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub services: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<&'static str>,
}

impl Workshop {
    /// Maps search link: coordinates when available, name + address text
    /// search otherwise.
    pub fn maps_url(&self) -> String {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => format!(
                "https://www.google.com/maps/search/{}/@{lat},{lng},16z",
                encode_query(self.name)
            ),
            _ => format!(
                "https://www.google.com/maps/search/{}",
                encode_query(&format!("{} {}", self.name, self.address))
            ),
        }
    }
}

fn encode_query(value: &str) -> String {
    value.replace(' ', "+")
}

static DIRECTORY: [Workshop; 3] = [
    Workshop {
        id: "t1",
        name: "Carrocerías Patria",
        address: "Av. Patria 123, GDL",
        phone: Some("+523311112233"),
        whatsapp: Some("523311112233"),
        lat: Some(20.6736),
        lng: Some(-103.344),
        services: &["pintura", "hojalatería", "pulido"],
        hours: Some("L–S 9:00–19:00"),
    },
    Workshop {
        id: "t2",
        name: "Detail Pro Circunvalación",
        address: "Circunvalación 456, GDL",
        phone: Some("+523312224455"),
        whatsapp: Some("523312224455"),
        lat: None,
        lng: None,
        services: &["detailing", "plásticos", "pulido"],
        hours: Some("L–V 10:00–18:00"),
    },
    Workshop {
        id: "t3",
        name: "Hojalatería & Pintura Centro",
        address: "5 de Mayo 789, Centro",
        phone: Some("+523317778899"),
        whatsapp: None,
        lat: None,
        lng: None,
        services: &["pintura", "abolladuras", "PDR"],
        hours: Some("L–S 9:30–18:30"),
    },
];

pub fn directory() -> &'static [Workshop] {
    &DIRECTORY
}

/// Substring search across name, address, hours, and services.
pub fn search(query: &str) -> Vec<&'static Workshop> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return DIRECTORY.iter().collect();
    }

    DIRECTORY
        .iter()
        .filter(|w| {
            let mut haystack = vec![w.name, w.address, w.hours.unwrap_or_default()];
            haystack.extend(w.services.iter().copied());
            haystack.join(" ").to_lowercase().contains(&needle)
        })
        .collect()
}
