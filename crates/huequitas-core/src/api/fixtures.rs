//! Seed data for the mock backend.

use chrono::{Duration, Utc};

use crate::model::{ChatMessage, Restaurant, User};

const PEXELS: &str = "https://images.pexels.com/photos";

struct Seed {
    name: &'static str,
    cuisine: &'static str,
    rating: f64,
    total: u32,
    latest_review: &'static str,
    address: &'static str,
    photo: &'static str,
}

const RESTAURANTS: &[Seed] = &[
    Seed {
        name: "El Rincón de la Abuela",
        cuisine: "Soups",
        rating: 4.8,
        total: 127,
        latest_review: "El mejor ajiaco que he probado, como en casa de mi abuela.",
        address: "Calle 85 #12-40, Bogotá",
        photo: "5409010/pexels-photo-5409010.jpeg",
    },
    Seed {
        name: "La Casa del Sancocho",
        cuisine: "Soups",
        rating: 4.6,
        total: 94,
        latest_review: "Sancocho trifásico abundante y muy bien sazonado.",
        address: "Carrera 7 #45-10, Bogotá",
        photo: "6210876/pexels-photo-6210876.jpeg",
    },
    Seed {
        name: "Bandeja Paisa Express",
        cuisine: "Main",
        rating: 4.9,
        total: 203,
        latest_review: "Porción gigante, el chicharrón estaba perfecto.",
        address: "Calle 10 #43-12, Medellín",
        photo: "7613568/pexels-photo-7613568.jpeg",
    },
    Seed {
        name: "Ajiaco Santafereño",
        cuisine: "Soups",
        rating: 4.7,
        total: 156,
        latest_review: "Las guascas le dan un sabor único. Muy recomendado.",
        address: "Calle 19 #3-50, Bogotá",
        photo: "5949888/pexels-photo-5949888.jpeg",
    },
    Seed {
        name: "La Lechonería",
        cuisine: "Main",
        rating: 4.5,
        total: 88,
        latest_review: "Lechona tolimense crujiente, ideal para compartir.",
        address: "Carrera 5 #12-30, Ibagué",
        photo: "2313686/pexels-photo-2313686.jpeg",
    },
    Seed {
        name: "Dulces de la Abuela",
        cuisine: "Desserts",
        rating: 4.9,
        total: 142,
        latest_review: "El arroz con leche y las brevas con arequipe, una delicia.",
        address: "Calle 53 #20-15, Bogotá",
        photo: "1291712/pexels-photo-1291712.jpeg",
    },
    Seed {
        name: "Arequipe & Café",
        cuisine: "Desserts",
        rating: 4.6,
        total: 76,
        latest_review: "Buen café de origen y postres caseros.",
        address: "Carrera 13 #93-40, Bogotá",
        photo: "302899/pexels-photo-302899.jpeg",
    },
    Seed {
        name: "El Fogón Llanero",
        cuisine: "Main",
        rating: 4.8,
        total: 112,
        latest_review: "La mamona a la llanera, jugosa y en su punto.",
        address: "Avenida 40 #25-18, Villavicencio",
        photo: "1639557/pexels-photo-1639557.jpeg",
    },
];

/// The eight seeded restaurants, with stable ids `1`..`8`.
pub fn restaurants() -> Vec<Restaurant> {
    RESTAURANTS
        .iter()
        .enumerate()
        .map(|(i, s)| Restaurant {
            id: (i + 1).to_string(),
            name: s.name.to_string(),
            description: s.latest_review.to_string(),
            address: s.address.to_string(),
            cuisine: s.cuisine.to_string(),
            rating: Some(s.rating),
            total_ratings: Some(s.total),
            image: Some(format!("{PEXELS}/{}", s.photo)),
        })
        .collect()
}

pub fn users() -> Vec<User> {
    [
        ("1", "Carlos Mendoza", "carlos@huequitas.co"),
        ("2", "María López", "maria@huequitas.co"),
        ("3", "Juan Pérez", "juan@huequitas.co"),
    ]
    .into_iter()
    .map(|(id, name, email)| User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
    })
    .collect()
}

/// Three chat messages spread over the last hour, oldest first.
pub fn chat_messages() -> Vec<ChatMessage> {
    let now = Utc::now();
    let users = users();
    [
        (3600, 0, "¿Alguien ha probado el nuevo sitio de ajiaco en La Candelaria?"),
        (3000, 1, "¡Sí! Muy bueno, aunque se llena a la hora del almuerzo."),
        (1800, 2, "Recomiendo ir temprano, antes de las 12."),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (ago, who, text))| ChatMessage {
        id: (i + 1).to_string(),
        user_id: users[who].id.clone(),
        user_name: users[who].name.clone(),
        message: text.to_string(),
        timestamp: now - Duration::seconds(ago),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_fixtures() {
        let all = restaurants();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0].name, "El Rincón de la Abuela");
        assert_eq!(all[2].rating, Some(4.9));
        assert_eq!(all[2].total_ratings, Some(203));
        assert_eq!(all.iter().filter(|r| r.cuisine == "Soups").count(), 3);
        assert!(all.iter().all(|r| r.image.as_deref().unwrap().starts_with(PEXELS)));
    }

    #[test]
    fn test_chat_fixtures_are_ordered() {
        let msgs = chat_messages();
        assert_eq!(msgs.len(), 3);
        assert!(msgs.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(msgs[0].user_name, "Carlos Mendoza");
    }
}
