//! Turns a user's scope choice into the opaque location token the market
//! data provider understands.

use crate::domain::{DataCenter, LocationScope, MarketError, World, WorldId};
use crate::infra::universalis::UniversalisClient;

pub struct Locations {
    worlds: Vec<World>,
    data_centers: Vec<DataCenter>,
}

impl Locations {
    pub fn new(worlds: Vec<World>, data_centers: Vec<DataCenter>) -> Self {
        Self {
            worlds,
            data_centers,
        }
    }

    pub async fn fetch(client: &UniversalisClient) -> Result<Self, MarketError> {
        let worlds = client.worlds().await?;
        let data_centers = client.data_centers().await?;
        Ok(Self::new(worlds, data_centers))
    }

    pub fn world_named(&self, name: &str) -> Option<&World> {
        self.worlds
            .iter()
            .find(|world| world.name.eq_ignore_ascii_case(name))
    }

    pub fn world_name(&self, id: WorldId) -> Option<&str> {
        self.worlds
            .iter()
            .find(|world| world.id == id)
            .map(|world| world.name.as_str())
    }

    pub fn data_center_of(&self, world_id: WorldId) -> Option<&DataCenter> {
        self.data_centers
            .iter()
            .find(|dc| dc.worlds.contains(&world_id))
    }

    /// Location token for a home world widened to the requested scope.
    ///
    /// None when the world is unknown, or when its datacenter cannot be found
    /// for the wider scopes.
    pub fn resolve(&self, scope: LocationScope, home_world: &str) -> Option<String> {
        let world = self.world_named(home_world)?;
        match scope {
            LocationScope::World => Some(world.name.clone()),
            LocationScope::DataCenter => {
                self.data_center_of(world.id).map(|dc| dc.name.clone())
            }
            LocationScope::Region => self.data_center_of(world.id).map(|dc| dc.region.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Locations {
        Locations::new(
            vec![
                World {
                    id: 34,
                    name: "Brynhildr".to_string(),
                },
                World {
                    id: 63,
                    name: "Ultros".to_string(),
                },
            ],
            vec![DataCenter {
                name: "Crystal".to_string(),
                region: "North-America".to_string(),
                worlds: vec![34, 63],
            }],
        )
    }

    #[test]
    fn resolves_each_scope_to_its_token() {
        let locations = sample();
        assert_eq!(
            locations.resolve(LocationScope::World, "ultros"),
            Some("Ultros".to_string())
        );
        assert_eq!(
            locations.resolve(LocationScope::DataCenter, "Ultros"),
            Some("Crystal".to_string())
        );
        assert_eq!(
            locations.resolve(LocationScope::Region, "Ultros"),
            Some("North-America".to_string())
        );
    }

    #[test]
    fn unknown_world_resolves_to_none() {
        assert_eq!(sample().resolve(LocationScope::World, "Chocobo"), None);
    }

    #[test]
    fn world_names_round_trip_by_id() {
        assert_eq!(sample().world_name(34), Some("Brynhildr"));
        assert_eq!(sample().world_name(999), None);
    }
}
