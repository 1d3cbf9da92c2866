use std::path::PathBuf;

use serde_json::{json, Value};
use xwalk_core::{EncounterEvaluator, ReferenceFrame, SafetyRules};
use xwalk_data::load_crossings;
use xwalk_runner::evaluate_window;
use xwalk_runner::output::{read_history, write_records};

const EGO: &str = r#"{"Longitude":-122.12858376770639,"Latitude":37.994154054077832,"Speed":6.679798923845544,"Direction":160.95483398600914,"FrontLat":37.994119617202621,"FrontLong":-122.1285687440529}"#;
const PED_NEAR: &str = r#"{"VehicleId":"188326","VehicleType":"Pedestrian","Longitude":-122.12837294588802,"Latitude":37.993740037830712,"Speed":1.1748109057466443,"Direction":-37.925715339300382}"#;
const PED_FAR: &str = r#"{"VehicleId":"188400","VehicleType":"Pedestrian","Longitude":-122.1360,"Latitude":37.9990,"Speed":1.2,"Direction":90.0}"#;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xwalk-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn history(rows: &[(&str, &str)]) -> Value {
    let response: Vec<Value> = rows
        .iter()
        .map(|(time, payload)| {
            json!({
                "Json": payload,
                "SeqId": 1,
                "Time": time,
                "Chid": 19200,
                "Flags": 0,
                "Priority": 0,
                "UserId": 0,
                "Events": []
            })
        })
        .collect();
    json!({ "ResponseType": 1, "Response": response })
}

#[tokio::test]
async fn saved_responses_produce_result_file() {
    let dir = scratch_dir("offline");

    let map = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "type_names": "Crossing", "id": "way/1" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-122.12840, 37.99370], [-122.12830, 37.99380]]
                }
            },
            {
                "type": "Feature",
                "properties": { "type_names": "Sidewalk", "id": "way/2" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-122.1360, 37.9990], [-122.1361, 37.9991]]
                }
            }
        ]
    });
    let map_path = dir.join("map.geojson");
    std::fs::write(&map_path, map.to_string()).unwrap();

    let ego_path = dir.join("ego.json");
    std::fs::write(
        &ego_path,
        history(&[("2022-07-20T17:00:01.1Z", EGO), ("2022-07-20T17:00:01.2Z", EGO)]).to_string(),
    )
    .unwrap();

    let ped_path = dir.join("pedestrians.json");
    std::fs::write(
        &ped_path,
        history(&[
            ("2022-07-20T17:00:01.1Z", PED_NEAR),
            ("2022-07-20T17:00:01.2Z", PED_FAR),
            ("2022-07-20T17:00:01.3Z", PED_NEAR),
        ])
        .to_string(),
    )
    .unwrap();

    let crossings = load_crossings(&map_path).unwrap();
    assert_eq!(crossings.len(), 1);

    let evaluator =
        EncounterEvaluator::new(ReferenceFrame::ccta_martinez(), SafetyRules::default(), &crossings);
    let ego = read_history(&ego_path).await.unwrap();
    let pedestrians = read_history(&ped_path).await.unwrap();
    let outcome = evaluate_window(&evaluator, &ego, &pedestrians);
    assert_eq!(outcome.unpaired, 1);

    let out_path = dir.join("out").join("result.json");
    write_records(&out_path, &outcome.records).await.unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let records = written.as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["PedestrianId"], "188326");
    assert_eq!(records[0]["NearCrossing"], 1);
    assert_eq!(records[0]["CrossingId"], "way/1");
    assert_eq!(records[0]["Chid"], 19200);

    assert_eq!(records[1]["PedestrianId"], "188400");
    assert_eq!(records[1]["NearCrossing"], 0);
    assert!(records[1]["CrossingId"].is_null());

    std::fs::remove_dir_all(dir).ok();
}
