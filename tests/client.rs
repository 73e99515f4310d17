//! Blocking client against a real server on an ephemeral port.

mod common;

use std::io::Cursor;
use std::net::TcpListener;
use std::path::Path;

use image::ImageFormat;
use nutrifit::client::{BackendClient, PanelOutcome, Shell};
use nutrifit::llm::{GenerativeModel, MockModel};
use nutrifit::models::{FitnessLevel, Gender, HealthProfile};

use common::{app_with, encoded_image, scratch_dir};

/// Serves the app on its own runtime thread and returns the base URL.
fn spawn_server(model: impl GenerativeModel + 'static) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_with(model);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn profile() -> HealthProfile {
    HealthProfile {
        age: 30,
        gender: Gender::Female,
        height: 165.0,
        weight: 58.0,
        goal: "Muscle gain".to_string(),
        allergies: "lactose".to_string(),
        fitness_level: FitnessLevel::Beginner,
    }
}

#[test]
fn meal_plan_round_trip() {
    let client = BackendClient::new(&spawn_server(MockModel::new()), None).unwrap();

    match client.generate_meal_plan(&profile()) {
        PanelOutcome::Success { heading, body } => {
            assert_eq!(heading, "Your AI Meal Plan");
            assert!(body.contains("Gender: Female"));
            assert!(body.contains("Allergies: lactose"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn food_upload_round_trip() {
    let client = BackendClient::new(&spawn_server(MockModel::new()), None).unwrap();
    let dir = scratch_dir("upload");
    let path = dir.join("toast.png");
    std::fs::write(&path, encoded_image(ImageFormat::Png, 3, 3)).unwrap();

    match client.analyze_food(&path) {
        PanelOutcome::Success { heading, body } => {
            assert_eq!(heading, "Nutritional Analysis");
            assert!(body.ends_with("[image 3x3]"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn corrupt_upload_shows_backend_error() {
    let client = BackendClient::new(&spawn_server(MockModel::new()), None).unwrap();
    let dir = scratch_dir("corrupt");
    let path = dir.join("broken.jpg");
    std::fs::write(&path, b"\xff\xd8\xff\xe0 definitely not a jpeg").unwrap();

    let outcome = client.analyze_food(&path);
    assert!(
        matches!(&outcome, PanelOutcome::BackendError(msg) if msg.starts_with("Cannot decode image")),
        "{outcome:?}"
    );
}

#[test]
fn missing_upload_file_fails_locally() {
    let client = BackendClient::new(&unreachable_url(), None).unwrap();
    let outcome = client.analyze_food(Path::new("/definitely/not/here.jpg"));
    assert!(matches!(outcome, PanelOutcome::Failed(msg) if msg.starts_with("Cannot read")));
}

#[test]
fn model_failure_and_empty_result() {
    let failing = BackendClient::new(&spawn_server(MockModel::failing("quota")), None).unwrap();
    assert_eq!(
        failing.ask("What is fiber?"),
        PanelOutcome::BackendError("quota".to_string())
    );

    let empty = BackendClient::new(&spawn_server(MockModel::replying("")), None).unwrap();
    assert_eq!(
        empty.ask("What is fiber?"),
        PanelOutcome::Warning("No answer returned.".to_string())
    );
}

#[test]
fn non_success_status_is_request_failed() {
    let base = spawn_server(MockModel::new());
    let client = BackendClient::new(&format!("{}/missing", base), None).unwrap();

    let outcome = client.ask("What is fiber?");
    assert!(matches!(outcome, PanelOutcome::RequestFailed { status: 404, .. }));
}

#[test]
fn base_url_whitespace_and_slash_are_tolerated() {
    let base = spawn_server(MockModel::new());
    let client = BackendClient::new(&format!(" {}/ ", base), None).unwrap();
    assert!(client.ask("Is sleep important?").is_success());
}

#[test]
fn connection_failure_does_not_end_the_session() {
    let down = BackendClient::new(&unreachable_url(), None).unwrap();
    assert!(matches!(down.ask("hello?"), PanelOutcome::ConnectionError(_)));
    assert!(matches!(
        down.generate_meal_plan(&profile()),
        PanelOutcome::ConnectionError(_)
    ));

    let mut output = Vec::new();
    Shell::new(
        &down,
        Cursor::new(&b"1\n30\n1\n175\n70\nFat loss\nnone\n2\n3\n\n3\nWhy sleep?\nq\n"[..]),
        &mut output,
    )
    .run()
    .unwrap();
    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("[error] Cannot connect to backend").count(), 2);
    assert!(output.contains("[warning] Please enter a question first."));
}

#[test]
fn shell_renders_live_answers() {
    let client = BackendClient::new(&spawn_server(MockModel::new()), None).unwrap();

    let mut output = Vec::new();
    Shell::new(&client, Cursor::new(&b"3\nIs fasting safe?\n"[..]), &mut output)
        .run()
        .unwrap();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("### Science-Backed Answer"));
    assert!(output.contains("Answer this health question scientifically: Is fasting safe?"));
}
