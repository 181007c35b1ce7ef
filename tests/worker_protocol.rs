//! End-to-end protocol tests: drive the worker loop over in-memory
//! streams and check every line it writes back.

use std::io::Cursor;
use whisperd::ipc::protocol::Status;
use whisperd::stt::transcriber::MockTranscriber;
use whisperd::worker::{Session, run_session};

fn session_with(mock: MockTranscriber) -> Session {
    Session::new(Box::new(mock), "tr".to_string())
}

/// Run a full session over `input` and return the response lines.
fn run_worker(session: &Session, input: Vec<u8>) -> Vec<String> {
    let mut reader = Cursor::new(input);
    let mut output = Vec::new();
    run_session(session, &mut reader, &mut output).expect("session failed");
    String::from_utf8(output)
        .expect("worker wrote invalid UTF-8")
        .lines()
        .map(str::to_string)
        .collect()
}

/// A transcribe command line announcing `bytes.len()` frame bytes,
/// followed by the frame itself.
fn transcribe_with_frame(language: Option<&str>, bytes: &[u8]) -> Vec<u8> {
    let mut stream = match language {
        Some(lang) => format!(
            "{{\"action\":\"transcribe\",\"length\":{},\"language\":\"{}\"}}\n",
            bytes.len(),
            lang
        )
        .into_bytes(),
        None => format!("{{\"action\":\"transcribe\",\"length\":{}}}\n", bytes.len()).into_bytes(),
    };
    stream.extend_from_slice(bytes);
    stream
}

/// `count` f32 samples of constant amplitude, as little-endian bytes.
fn samples(count: usize, amplitude: f32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(count * 4);
    for _ in 0..count {
        bytes.extend_from_slice(&amplitude.to_le_bytes());
    }
    bytes
}

#[test]
fn test_session_opens_listening_and_closes_shutdown() {
    let session = session_with(MockTranscriber::new("base"));
    let lines = run_worker(&session, Vec::new());
    assert_eq!(
        lines,
        vec![r#"{"status":"listening"}"#, r#"{"status":"shutdown"}"#]
    );
}

#[test]
fn test_every_output_line_is_a_status_message() {
    let session = session_with(MockTranscriber::new("base"));

    let mut input = b"{\"action\":\"ping\"}\nnot json\n".to_vec();
    input.extend_from_slice(&transcribe_with_frame(None, &samples(2000, 0.0)));

    for line in run_worker(&session, input) {
        Status::from_json(&line)
            .unwrap_or_else(|e| panic!("unparseable status line {:?}: {}", line, e));
    }
}

#[test]
fn test_ping_answers_pong() {
    let session = session_with(MockTranscriber::new("base"));
    let lines = run_worker(&session, b"{\"action\":\"ping\"}\n".to_vec());
    assert_eq!(lines[1], r#"{"status":"pong"}"#);
}

#[test]
fn test_exit_shuts_down_and_stops_reading() {
    let session = session_with(MockTranscriber::new("base"));
    let lines = run_worker(
        &session,
        b"{\"action\":\"exit\"}\n{\"action\":\"ping\"}\n".to_vec(),
    );
    assert_eq!(
        lines,
        vec![r#"{"status":"listening"}"#, r#"{"status":"shutdown"}"#],
        "nothing after exit may be processed"
    );
}

#[test]
fn test_short_silent_frame_yields_exact_empty_success() {
    let session = session_with(MockTranscriber::new("base"));

    // 8000 bytes are 2000 samples, under the silence gate
    let input = transcribe_with_frame(None, &samples(2000, 0.0));
    let lines = run_worker(&session, input);

    assert_eq!(
        lines[1],
        r#"{"status":"success","text":"","language":"tr"}"#,
        "short silent audio must produce the exact empty success line"
    );
}

#[test]
fn test_silence_never_reaches_the_model() {
    let mock = MockTranscriber::new("base");
    let session = session_with(mock.clone());

    run_worker(
        &session,
        transcribe_with_frame(None, &samples(2000, 0.0)),
    );
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_audible_frame_reaches_the_model_padded() {
    let mock = MockTranscriber::new("base").with_response("merhaba");
    let session = session_with(mock.clone());

    // Half a second of audible audio pads to a full second
    let lines = run_worker(
        &session,
        transcribe_with_frame(None, &samples(8000, 0.5)),
    );

    assert_eq!(
        lines[1],
        r#"{"status":"success","text":"merhaba","language":"tr"}"#
    );
    assert_eq!(
        mock.call_lengths(),
        vec![16000],
        "model must see exactly one second of padded audio"
    );
}

#[test]
fn test_command_language_overrides_default() {
    let mock = MockTranscriber::new("base").with_response("hallo");
    let session = session_with(mock.clone());

    let lines = run_worker(
        &session,
        transcribe_with_frame(Some("de"), &samples(16000, 0.5)),
    );

    assert_eq!(
        lines[1],
        r#"{"status":"success","text":"hallo","language":"de"}"#
    );
}

#[test]
fn test_malformed_line_reports_error_then_recovers() {
    let session = session_with(MockTranscriber::new("base"));

    let lines = run_worker(&session, b"this is not json\n{\"action\":\"ping\"}\n".to_vec());

    match Status::from_json(&lines[1]) {
        Ok(Status::Error { message }) => {
            assert!(
                message.starts_with("Malformed command:"),
                "expected malformed-command error, got: {}",
                message
            );
        }
        other => panic!("expected error status, got {:?}", other),
    }
    assert_eq!(lines[2], r#"{"status":"pong"}"#, "loop must keep serving");
    assert_eq!(lines[3], r#"{"status":"shutdown"}"#);
}

#[test]
fn test_unknown_action_reports_error_then_recovers() {
    let session = session_with(MockTranscriber::new("base"));

    let lines = run_worker(
        &session,
        b"{\"action\":\"reboot\"}\n{\"action\":\"ping\"}\n".to_vec(),
    );

    assert!(matches!(
        Status::from_json(&lines[1]),
        Ok(Status::Error { .. })
    ));
    assert_eq!(lines[2], r#"{"status":"pong"}"#);
}

#[test]
fn test_blank_lines_get_no_response() {
    let session = session_with(MockTranscriber::new("base"));

    let lines = run_worker(&session, b"\n   \n{\"action\":\"ping\"}\n".to_vec());

    assert_eq!(
        lines,
        vec![
            r#"{"status":"listening"}"#,
            r#"{"status":"pong"}"#,
            r#"{"status":"shutdown"}"#
        ]
    );
}

#[test]
fn test_truncated_frame_reports_both_counts() {
    let session = session_with(MockTranscriber::new("base"));

    // Announce 8000 bytes, deliver 100, then the stream ends
    let mut input = b"{\"action\":\"transcribe\",\"length\":8000}\n".to_vec();
    input.extend_from_slice(&samples(25, 0.0));
    let lines = run_worker(&session, input);

    match Status::from_json(&lines[1]) {
        Ok(Status::Error { message }) => {
            assert!(
                message.contains("expected 8000 bytes, got 100"),
                "error must name both counts, got: {}",
                message
            );
        }
        other => panic!("expected error status, got {:?}", other),
    }
    assert_eq!(
        lines[2],
        r#"{"status":"shutdown"}"#,
        "end of input after the error must still shut down cleanly"
    );
}

#[test]
fn test_frame_bytes_do_not_leak_into_next_command() {
    let session = session_with(MockTranscriber::new("base"));

    let mut input = transcribe_with_frame(None, &samples(2000, 0.0));
    input.extend_from_slice(b"{\"action\":\"ping\"}\n");
    let lines = run_worker(&session, input);

    assert_eq!(
        lines,
        vec![
            r#"{"status":"listening"}"#,
            r#"{"status":"success","text":"","language":"tr"}"#,
            r#"{"status":"pong"}"#,
            r#"{"status":"shutdown"}"#
        ]
    );
}

#[test]
fn test_nan_audio_reports_invalid_data_and_continues() {
    let mock = MockTranscriber::new("base");
    let session = session_with(mock.clone());

    let mut frame = samples(16000, 0.5);
    frame[0..4].copy_from_slice(&f32::NAN.to_le_bytes());
    let mut input = transcribe_with_frame(None, &frame);
    input.extend_from_slice(b"{\"action\":\"ping\"}\n");
    let lines = run_worker(&session, input);

    assert_eq!(
        lines[1],
        r#"{"status":"error","message":"Invalid audio data (NaN or Inf)"}"#
    );
    assert_eq!(lines[2], r#"{"status":"pong"}"#);
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_model_failure_is_recoverable() {
    let session = session_with(MockTranscriber::new("base").with_failure());

    let mut input = transcribe_with_frame(None, &samples(16000, 0.5));
    input.extend_from_slice(b"{\"action\":\"ping\"}\n");
    let lines = run_worker(&session, input);

    assert_eq!(
        lines[1],
        r#"{"status":"error","message":"Transcription error: mock transcription failure"}"#
    );
    assert_eq!(lines[2], r#"{"status":"pong"}"#);
}

#[test]
fn test_model_panic_is_caught_and_recoverable() {
    let session = session_with(MockTranscriber::new("base").with_panic());

    let mut input = transcribe_with_frame(None, &samples(16000, 0.5));
    input.extend_from_slice(b"{\"action\":\"ping\"}\n");
    let lines = run_worker(&session, input);

    match Status::from_json(&lines[1]) {
        Ok(Status::Error { message }) => {
            assert!(
                message.starts_with("Unexpected error:"),
                "panic must surface as a generic error, got: {}",
                message
            );
        }
        other => panic!("expected error status, got {:?}", other),
    }
    assert_eq!(lines[2], r#"{"status":"pong"}"#);
    assert_eq!(lines[3], r#"{"status":"shutdown"}"#);
}

#[test]
fn test_quiet_audio_is_treated_as_silence() {
    let mock = MockTranscriber::new("base");
    let session = session_with(mock.clone());

    // A full second of audio below the energy floor
    let lines = run_worker(
        &session,
        transcribe_with_frame(None, &samples(16000, 0.0005)),
    );

    assert_eq!(
        lines[1],
        r#"{"status":"success","text":"","language":"tr"}"#
    );
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_loud_audio_is_normalized_before_the_model() {
    let mock = MockTranscriber::new("base");
    let session = session_with(mock.clone());

    run_worker(&session, transcribe_with_frame(None, &samples(16000, 2.0)));

    assert_eq!(mock.call_count(), 1);
}

#[test]
fn test_full_session_script() {
    let mock = MockTranscriber::new("base").with_response("test passed");
    let session = session_with(mock.clone());

    let mut input = Vec::new();
    input.extend_from_slice(b"{\"action\":\"ping\"}\n");
    input.extend_from_slice(&transcribe_with_frame(None, &samples(2000, 0.0)));
    input.extend_from_slice(b"garbage\n");
    input.extend_from_slice(&transcribe_with_frame(Some("en"), &samples(16000, 0.5)));
    input.extend_from_slice(b"{\"action\":\"exit\"}\n");

    let lines = run_worker(&session, input);

    assert_eq!(lines.len(), 6, "got: {:?}", lines);
    assert_eq!(lines[0], r#"{"status":"listening"}"#);
    assert_eq!(lines[1], r#"{"status":"pong"}"#);
    assert_eq!(
        lines[2],
        r#"{"status":"success","text":"","language":"tr"}"#
    );
    assert!(matches!(
        Status::from_json(&lines[3]),
        Ok(Status::Error { .. })
    ));
    assert_eq!(
        lines[4],
        r#"{"status":"success","text":"test passed","language":"en"}"#
    );
    assert_eq!(lines[5], r#"{"status":"shutdown"}"#);
    assert_eq!(mock.call_count(), 1, "only the audible frame runs inference");
}
