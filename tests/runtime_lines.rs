// tests/runtime_lines.rs

mod common;
use crate::common::builders::{self, RequestBuilder, script};
use crate::common::{init_tracing, parse_responses, quick_settings, with_timeout};

use std::error::Error;

use tokio::io::{AsyncWriteExt, BufReader};

use engine_supervisor::dispatch::{Dispatcher, Runtime};
use engine_supervisor::protocol::{ErrorCode, Response};
use engine_supervisor_test_utils::fake_launcher::FakeLauncher;

type TestResult = Result<(), Box<dyn Error>>;

async fn run_script(launcher: FakeLauncher, input: Vec<u8>) -> Result<Vec<Response>, Box<dyn Error>> {
    let runtime = Runtime::new(Dispatcher::new(launcher, quick_settings()));
    let mut output = Vec::new();

    with_timeout(runtime.run(
        BufReader::new(input.as_slice()),
        &mut output,
        std::future::pending::<()>(),
    ))
    .await?;

    Ok(parse_responses(&output))
}

#[tokio::test]
async fn one_response_per_request_in_order() -> TestResult {
    init_tracing();

    let launcher = FakeLauncher::new();
    let input = script(&[
        builders::create(&["/bin/engine"]),
        builders::start("godot_1"),
        builders::iteration("godot_1"),
        builders::send_message("godot_1", "hi"),
        builders::shutdown("godot_1"),
        builders::iteration("godot_1"),
    ]);

    let responses = run_script(launcher.clone(), input).await?;

    assert_eq!(
        responses,
        vec![
            Response::created("godot_1".to_string()),
            Response::ack(),
            Response {
                ok: true,
                quit: Some(false),
                ..Response::default()
            },
            Response::ack(),
            Response::ack(),
            Response::failure(ErrorCode::InvalidRef),
        ]
    );
    assert_eq!(launcher.control(0).written(), vec!["MSG:hi", "QUIT"]);

    Ok(())
}

#[tokio::test]
async fn bad_lines_get_errors_and_loop_continues() -> TestResult {
    init_tracing();

    let mut input = script(&[
        RequestBuilder::without_cmd().reference("godot_1").build(),
        "this is not json".to_string(),
        String::new(),
        RequestBuilder::new("fly").build(),
    ]);
    input.extend_from_slice(b"{\"cmd\":\"start\",\"ref\":\"\xff\"}\n");
    input.extend_from_slice(builders::shutdown("godot_999").as_bytes());
    input.push(b'\n');

    let responses = run_script(FakeLauncher::new(), input).await?;

    // The blank line produced nothing.
    assert_eq!(
        responses,
        vec![
            Response::failure(ErrorCode::ParseError),
            Response::failure(ErrorCode::ParseError),
            Response::failure(ErrorCode::UnknownCommand),
            Response::failure(ErrorCode::ParseError),
            Response::failure(ErrorCode::InvalidRef),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn last_line_without_newline_is_processed() -> TestResult {
    init_tracing();

    let input = builders::create(&["/bin/engine"]).into_bytes();
    let responses = run_script(FakeLauncher::new(), input).await?;

    assert_eq!(responses, vec![Response::created("godot_1".to_string())]);
    Ok(())
}

#[tokio::test]
async fn end_of_input_tears_down_outstanding_children() -> TestResult {
    init_tracing();

    let launcher = FakeLauncher::stubborn();
    let input = script(&[
        builders::create(&["/bin/engine"]),
        builders::create(&["/bin/engine"]),
    ]);

    let responses = run_script(launcher.clone(), input).await?;
    assert_eq!(responses.len(), 2);

    for index in 0..2 {
        let state = launcher.control(index).snapshot();
        assert_eq!(state.terminate_requests, 1);
        assert!(state.killed);
        assert_eq!(state.channels_closed, 1);
    }

    Ok(())
}

#[tokio::test]
async fn shutdown_signal_ends_loop_and_tears_down() -> TestResult {
    init_tracing();

    let launcher = FakeLauncher::new();
    let runtime = Runtime::new(Dispatcher::new(launcher.clone(), quick_settings()));

    // Input that never reaches EOF on its own.
    let (mut driver, supervisor_side) = tokio::io::duplex(1024);
    let mut output = Vec::new();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let create_line = format!("{}\n", builders::create(&["/bin/engine"]));
    driver.write_all(create_line.as_bytes()).await?;

    let run = runtime.run(BufReader::new(supervisor_side), &mut output, async move {
        let _ = stop_rx.await;
    });

    let probe = launcher.clone();
    let stopper = async move {
        // Give the loop time to process the create.
        while probe.launch_count() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let _ = stop_tx.send(());
    };

    let (result, ()) = with_timeout(async move { tokio::join!(run, stopper) }).await;
    result?;

    assert_eq!(parse_responses(&output), vec![Response::created("godot_1".to_string())]);
    assert_eq!(launcher.control(0).snapshot().terminate_requests, 1);
    drop(driver);

    Ok(())
}
