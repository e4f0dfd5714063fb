use crate::domain::model::{City, Hotel};
use std::collections::{BTreeSet, HashMap};

// A hotel whose city is unknown resolves to `None` and stays in the result.
#[derive(Debug, Clone, Default)]
pub struct CityIndex {
    by_id: HashMap<i64, City>,
    duplicates: BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHotel {
    pub hotel: Hotel,
    pub city: Option<City>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub hotels: Vec<ResolvedHotel>,
    /// Ids of hotels whose `city` matched no city.
    pub unresolved: Vec<i64>,
}

impl CityIndex {
    /// First occurrence of an id wins; later ones are only recorded.
    pub fn new(cities: &[City]) -> Self {
        let mut by_id = HashMap::with_capacity(cities.len());
        let mut duplicates = BTreeSet::new();

        for city in cities {
            if by_id.contains_key(&city.id) {
                tracing::debug!("Duplicate city id {} ignored ({})", city.id, city.name);
                duplicates.insert(city.id);
            } else {
                by_id.insert(city.id, city.clone());
            }
        }

        Self { by_id, duplicates }
    }

    pub fn get(&self, id: i64) -> Option<&City> {
        self.by_id.get(&id)
    }

    pub fn resolve(&self, hotel: &Hotel) -> Option<&City> {
        self.get(hotel.city)
    }

    pub fn resolve_all(&self, hotels: &[Hotel]) -> Resolution {
        let mut resolution = Resolution::default();

        for hotel in hotels {
            let city = self.resolve(hotel).cloned();
            if city.is_none() {
                resolution.unresolved.push(hotel.id);
            }
            resolution.hotels.push(ResolvedHotel {
                hotel: hotel.clone(),
                city,
            });
        }

        resolution
    }

    pub fn duplicate_ids(&self) -> Vec<i64> {
        self.duplicates.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

pub fn hotels_in(city_id: i64, hotels: &[Hotel]) -> Vec<&Hotel> {
    hotels.iter().filter(|h| h.city == city_id).collect()
}
