//! Verify request builders and response decoders against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector describes an operation, its inputs, the expected request, a
//! simulated response and the expected typed result (`null` when the payload
//! must come out absent). Expected results are deserialized into the typed
//! model before comparing, so numeric formatting in the files does not matter.

use std::fmt::Debug;

use hevy_core::request::{
    CreateWorkout, GetExerciseTemplate, GetExerciseTemplates, GetRoutine, GetRoutines,
    GetWorkout, GetWorkoutCount, GetWorkouts, UpdateRoutine,
};
use hevy_core::{
    ApiRequest, ApiResponse, Entity, EntityResponse, HttpMethod, HttpRequest, HttpResponse,
    PageResponse, PagedEntity, Pagination, Routine, Workout,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn build(name: &str, request: &dyn ApiRequest) -> HttpRequest {
    request
        .to_http(BASE_URL, &[])
        .unwrap_or_else(|e| panic!("{name}: build failed: {e}"))
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    match expected.get("body") {
        Some(body) => assert_eq!(req.body.as_ref(), Some(body), "{name}: body"),
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Default::default(),
        data: HttpResponse::parse_body(sim["body"].as_str().unwrap()),
    }
}

fn pagination(case: &Value) -> Pagination {
    let input = &case["input"];
    Pagination::new(
        input["page"].as_u64().unwrap() as u32,
        input["page_size"].as_u64().unwrap() as u32,
    )
}

fn input_id(case: &Value) -> &str {
    case["input_id"].as_str().unwrap()
}

fn input<T: serde::de::DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn check_entity<E: Entity + PartialEq + Debug>(name: &str, case: &Value) {
    let response = EntityResponse::<E>::from_http(simulated(case));
    let expected = &case["expected_result"];
    if expected.is_null() {
        assert!(response.entity().is_none(), "{name}: expected absent payload");
    } else {
        let expected: E = serde_json::from_value(expected.clone()).unwrap();
        assert_eq!(response.entity(), Some(&expected), "{name}: parsed result");
    }
}

fn check_page<E: PagedEntity + PartialEq + Debug>(name: &str, case: &Value) {
    let response = PageResponse::<E>::from_http(simulated(case));
    let expected = &case["expected_result"];
    assert!(response.is_success(), "{name}: status");
    assert_eq!(response.page(), expected["page"].as_u64().map(|n| n as u32), "{name}: page");
    assert_eq!(
        response.page_count(),
        expected["page_count"].as_u64().map(|n| n as u32),
        "{name}: page_count"
    );
    let items: Vec<E> = serde_json::from_value(expected["items"].clone()).unwrap();
    assert_eq!(response.items(), items.as_slice(), "{name}: items");
}

fn run(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        match case["operation"].as_str().unwrap() {
            "get_workout_count" => {
                check_request(name, &build(name, &GetWorkoutCount), expected_req);
                check_entity::<hevy_core::WorkoutCount>(name, case);
            }
            "get_workouts" => {
                let request = GetWorkouts { pagination: pagination(case) };
                check_request(name, &build(name, &request), expected_req);
                check_page::<Workout>(name, case);
            }
            "get_workout" => {
                let request = GetWorkout { id: input_id(case) };
                check_request(name, &build(name, &request), expected_req);
                check_entity::<Workout>(name, case);
            }
            "create_workout" => {
                let workout: Workout = input(case);
                check_request(name, &build(name, &CreateWorkout { workout: &workout }), expected_req);
                check_entity::<Workout>(name, case);
            }
            "get_routines" => {
                let request = GetRoutines { pagination: pagination(case) };
                check_request(name, &build(name, &request), expected_req);
                check_page::<Routine>(name, case);
            }
            "get_routine" => {
                let request = GetRoutine { id: input_id(case) };
                check_request(name, &build(name, &request), expected_req);
                check_entity::<Routine>(name, case);
            }
            "update_routine" => {
                let routine: Routine = input(case);
                let request = UpdateRoutine { id: input_id(case), routine: &routine };
                check_request(name, &build(name, &request), expected_req);
                check_entity::<Routine>(name, case);
            }
            "get_exercise_templates" => {
                let request = GetExerciseTemplates { pagination: pagination(case) };
                check_request(name, &build(name, &request), expected_req);
                check_page::<hevy_core::ExerciseTemplate>(name, case);
            }
            "get_exercise_template" => {
                let request = GetExerciseTemplate { id: input_id(case) };
                check_request(name, &build(name, &request), expected_req);
                check_entity::<hevy_core::ExerciseTemplate>(name, case);
            }
            other => panic!("{name}: unknown operation: {other}"),
        }
    }
}

#[test]
fn workout_test_vectors() {
    run(include_str!("../../test-vectors/workouts.json"));
}

#[test]
fn routine_test_vectors() {
    run(include_str!("../../test-vectors/routines.json"));
}

#[test]
fn exercise_template_test_vectors() {
    run(include_str!("../../test-vectors/exercise_templates.json"));
}
