use aquarium_schemas::{
    parameters::WaterParameterSnapshot,
    tank::{Tank, WaterType},
};

pub fn nominal_tank() -> Tank {
    Tank {
        id: "tank-1".to_string(),
        name: "Community 120".to_string(),
        water_type: WaterType::Freshwater,
        volume: Some(120.0),
        parameters: WaterParameterSnapshot {
            temp_c: 25.0,
            ph: 7.0,
            ammonia: 0.0,
            nitrite: 0.0,
            nitrate: 10.0,
            gh: Some(8.0),
            kh: Some(5.0),
            tds: None,
            salinity: None,
        },
        inhabitants: Vec::new(),
    }
}

pub fn saltwater_tank() -> Tank {
    let mut tank = nominal_tank();
    tank.id = "tank-2".to_string();
    tank.name = "Reef 200".to_string();
    tank.water_type = WaterType::Saltwater;
    tank.parameters.ph = 8.2;
    tank.parameters.gh = None;
    tank.parameters.salinity = Some(35.0);
    tank
}
