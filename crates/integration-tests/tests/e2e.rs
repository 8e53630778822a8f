//! End-to-end tests for the speech endpoints

mod harness;

use std::io::Cursor;

use harness::config::ConfigBuilder;
use harness::server::TestServer;
use serde_json::json;

#[cfg(unix)]
use harness::fake_engine::{CLIP_FRAMES, CLIP_SAMPLE_RATE, FakeEngine};

fn read_wav(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(Cursor::new(bytes.to_vec())).unwrap();
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().map(Result::unwrap).collect();
    (spec, samples)
}

// -- Silence (no model) --

#[tokio::test]
async fn hello_without_model_returns_one_second_of_silence() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.synthesize(json!({ "text": "Hello" })).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "audio/wav");
    assert_eq!(resp.headers()["content-disposition"], "inline; filename=\"speech.wav\"");
    assert_eq!(resp.headers()[tts::PROVIDER_HEADER], "silence");

    let bytes = resp.bytes().await.unwrap();
    let (spec, samples) = read_wav(&bytes);

    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22_050);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(samples.len(), 22_050);
    assert!(samples.iter().all(|&s| s == 0));
}

#[tokio::test]
async fn missing_text_is_rejected() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.synthesize(json!({ "language": "en", "speed": 1.0 })).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing text parameter" }));
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.synthesize(json!({ "text": " \n\t " })).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Empty text" }));
}

#[tokio::test]
async fn invalid_speed_is_rejected() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.synthesize(json!({ "text": "Hello", "speed": -2 })).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid speed"));
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/api/tts"))
        .header("content-type", "text/plain")
        .body("Hello")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 415);
}

#[tokio::test]
async fn voices_without_model() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().get(server.url("/api/voices")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "model": "silence", "loaded": false, "supported_languages": ["en"] })
    );
}

#[tokio::test]
async fn repeated_requests_reuse_one_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new().with_artifacts(dir.path(), None).build();
    let server = TestServer::start(config).await.unwrap();

    for _ in 0..3 {
        let resp = server.synthesize(json!({ "text": "Hello" })).await;
        assert_eq!(resp.status(), 200);
    }
    let resp = server.synthesize(json!({ "text": "Hello", "speed": 1.5 })).await;
    assert_eq!(resp.status(), 200);

    let wavs = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "wav"))
        .count();

    // Same request, same name; a different speed gets its own file
    assert_eq!(wavs, 2);
}

#[tokio::test]
async fn artifact_bound_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new().with_artifacts(dir.path(), Some(2)).build();
    let server = TestServer::start(config).await.unwrap();

    for text in ["one", "two", "three", "four"] {
        let resp = server.synthesize(json!({ "text": text })).await;
        assert_eq!(resp.status(), 200);
    }

    let wavs = std::fs::read_dir(dir.path()).unwrap().filter_map(Result::ok).count();
    assert_eq!(wavs, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_store_serves_every_concurrent_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new().with_artifacts(dir.path(), Some(1)).build();
    let server = TestServer::start(config).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..64 {
        let client = server.client().clone();
        let url = server.url("/api/tts");
        handles.push(tokio::spawn(async move {
            let resp = client
                .post(url)
                .json(&json!({ "text": format!("sentence {i}") }))
                .send()
                .await
                .unwrap();
            let status = resp.status();
            (status, resp.bytes().await.unwrap())
        }));
    }

    for handle in handles {
        let (status, bytes) = handle.await.unwrap();
        assert_eq!(status, 200, "body: {}", String::from_utf8_lossy(&bytes));

        let (_, samples) = read_wav(&bytes);
        assert_eq!(samples.len(), 22_050);
    }

    let wavs = std::fs::read_dir(dir.path()).unwrap().filter_map(Result::ok).count();
    assert_eq!(wavs, 1);
}

#[tokio::test]
async fn concurrent_identical_requests_all_get_complete_audio() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = server.client().clone();
        let url = server.url("/api/tts");
        handles.push(tokio::spawn(async move {
            let resp = client.post(url).json(&json!({ "text": "Same text" })).send().await.unwrap();
            assert_eq!(resp.status(), 200);
            resp.bytes().await.unwrap()
        }));
    }

    for handle in handles {
        let bytes = handle.await.unwrap();
        let (_, samples) = read_wav(&bytes);
        assert_eq!(samples.len(), 22_050);
    }

    let wavs = std::fs::read_dir(server.artifact_root())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "wav"))
        .count();
    assert_eq!(wavs, 1);
}

// -- Model-backed --

#[cfg(unix)]
#[tokio::test]
async fn model_output_is_streamed() {
    let engine = FakeEngine::working().unwrap();
    let config = ConfigBuilder::new()
        .with_model(engine.binary(), &[engine.model().to_path_buf()])
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.synthesize(json!({ "text": "Hello world", "speed": "1.2" })).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()[tts::PROVIDER_HEADER], "model");
    assert_eq!(resp.headers()[tts::FALLBACK_HEADER], "false");

    let bytes = resp.bytes().await.unwrap();
    let (spec, samples) = read_wav(&bytes);
    assert_eq!(spec.sample_rate, CLIP_SAMPLE_RATE);
    assert_eq!(samples.len(), CLIP_FRAMES as usize);
    assert!(samples.iter().any(|&s| s != 0));
}

#[cfg(unix)]
#[tokio::test]
async fn model_health_and_voices() {
    let engine = FakeEngine::working().unwrap();
    let config = ConfigBuilder::new()
        .with_model(engine.binary(), &[engine.model().to_path_buf()])
        .build();
    let server = TestServer::start(config).await.unwrap();

    let health: serde_json::Value = server
        .client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["model_loaded"], true);
    assert!(health["version"].as_str().unwrap().ends_with("-real"));

    let voices: serde_json::Value = server
        .client()
        .get(server.url("/api/voices"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(voices["model"], "en_US-test-medium");
    assert_eq!(voices["loaded"], true);
}

#[cfg(unix)]
#[tokio::test]
async fn second_model_used_when_first_is_missing() {
    let engine = FakeEngine::working().unwrap();
    let missing = engine.root().join("missing.onnx");
    let config = ConfigBuilder::new()
        .with_model(engine.binary(), &[missing, engine.model().to_path_buf()])
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.synthesize(json!({ "text": "Hello" })).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()[tts::PROVIDER_HEADER], "model");
}

#[cfg(unix)]
#[tokio::test]
async fn crashing_model_falls_back_to_silence() {
    let engine = FakeEngine::crashing().unwrap();
    let config = ConfigBuilder::new()
        .with_model(engine.binary(), &[engine.model().to_path_buf()])
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.synthesize(json!({ "text": "Hello" })).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()[tts::PROVIDER_HEADER], "silence");
    assert_eq!(resp.headers()[tts::FALLBACK_HEADER], "true");

    let bytes = resp.bytes().await.unwrap();
    let (spec, samples) = read_wav(&bytes);
    assert_eq!(spec.sample_rate, 22_050);
    assert_eq!(samples.len(), 22_050);
    assert!(samples.iter().all(|&s| s == 0));
}
