//! End-to-end pipeline tests against a scripted synthesizer

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use tts_core::{
    encode_base64, synthesis_events, PipelineConfig, PipelineState, ProgressObserver, RiffSize,
    SpeechRequest, SpeechSynthesizer, SynthesisEvent, SynthesisPipeline, SynthesisRequest,
    TtsError, VoiceId, WavOptions,
};

/// Returns `pcm` for every call, except call `fail_at` (if set), which errors.
struct FakeSynthesizer {
    pcm: Vec<u8>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
    seen: Mutex<Vec<SynthesisRequest>>,
}

impl FakeSynthesizer {
    fn new(pcm: Vec<u8>) -> Self {
        Self {
            pcm,
            fail_at: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> anyhow::Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        if self.fail_at == Some(call) {
            anyhow::bail!("quota exceeded for segment {call}");
        }
        Ok(encode_base64(&self.pcm))
    }
}

struct EmptyPayload;

#[async_trait]
impl SpeechSynthesizer for EmptyPayload {
    async fn synthesize(&self, _request: &SynthesisRequest) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<f32>>,
    states: Mutex<Vec<PipelineState>>,
}

impl ProgressObserver for Recorder {
    fn on_progress(&self, percent: f32) {
        self.progress.lock().unwrap().push(percent);
    }

    fn on_state(&self, state: &PipelineState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

fn pipeline_with(synth: Arc<FakeSynthesizer>, config: PipelineConfig) -> SynthesisPipeline {
    SynthesisPipeline::new(synth, config)
}

#[tokio::test]
async fn test_hello_world_end_to_end() {
    let pcm = vec![0x00, 0x00, 0x00, 0x40];
    let synth = Arc::new(FakeSynthesizer::new(pcm.clone()));
    let pipeline = pipeline_with(synth.clone(), PipelineConfig::default());

    let request = SpeechRequest::new("hello world", VoiceId::Zephyr);
    let output = pipeline.synthesize(&request, None).await.unwrap();

    assert_eq!(synth.calls(), 1);
    assert_eq!(synth.seen.lock().unwrap()[0].segment_text, "hello world");
    assert_eq!(output.segments, 1);
    assert_eq!(output.metadata.frames, 2);
    assert_eq!(output.metadata.channels, 1);
    assert_eq!(output.metadata.sample_rate, 24_000);

    let bytes = output.wav.as_bytes();
    assert_eq!(bytes.len(), 48);
    assert_eq!(&bytes[44..48], pcm.as_slice());
}

#[tokio::test]
async fn test_segments_are_sent_in_order_with_voice_and_style() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x10]));
    let config = PipelineConfig {
        max_words_per_chunk: 3,
        ..Default::default()
    };
    let pipeline = pipeline_with(synth.clone(), config);

    let request = SpeechRequest::new("one two three four five six seven", VoiceId::Charon)
        .with_style("whispering");
    let output = pipeline.synthesize(&request, None).await.unwrap();

    assert_eq!(output.segments, 3);
    assert_eq!(output.metadata.frames, 3);

    let seen = synth.seen.lock().unwrap();
    let texts: Vec<&str> = seen.iter().map(|r| r.segment_text.as_str()).collect();
    assert_eq!(texts, vec!["one two three", "four five six", "seven"]);
    assert!(seen.iter().all(|r| r.voice == VoiceId::Charon && r.style == "whispering"));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]));
    let config = PipelineConfig {
        max_words_per_chunk: 2,
        ..Default::default()
    };
    let pipeline = pipeline_with(synth, config);
    let recorder = Recorder::default();

    pipeline
        .synthesize(&SpeechRequest::new(words(8), VoiceId::Kore), Some(&recorder))
        .await
        .unwrap();

    let progress = recorder.progress.lock().unwrap().clone();
    assert_eq!(progress, vec![0.0, 25.0, 50.0, 75.0, 100.0]);

    let states = recorder.states.lock().unwrap().clone();
    assert_eq!(states.first(), Some(&PipelineState::Idle));
    assert_eq!(states[1], PipelineState::Chunking);
    assert_eq!(states[2], PipelineState::Synthesizing { index: 0, total: 4 });
    assert_eq!(states.last(), Some(&PipelineState::Done));
    assert!(states.contains(&PipelineState::Merging));
    assert!(states.contains(&PipelineState::Encoding));
}

#[tokio::test]
async fn test_closure_observer() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]));
    let pipeline = pipeline_with(synth, PipelineConfig::default());
    let seen = Mutex::new(Vec::new());
    let observer = |p: f32| seen.lock().unwrap().push(p);

    pipeline
        .synthesize(&SpeechRequest::new("hi", VoiceId::Puck), Some(&observer))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0.0, 100.0]);
}

#[tokio::test]
async fn test_text_too_long_makes_no_calls() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]));
    let pipeline = pipeline_with(synth.clone(), PipelineConfig::default());

    let result = pipeline
        .synthesize(&SpeechRequest::new(words(10_001), VoiceId::Zephyr), None)
        .await;

    assert!(matches!(
        result,
        Err(TtsError::TextTooLong { words: 10_001, max: 10_000 })
    ));
    assert_eq!(synth.calls(), 0);
}

#[tokio::test]
async fn test_word_limit_is_inclusive() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]));
    let pipeline = pipeline_with(synth.clone(), PipelineConfig::default());

    let output = pipeline
        .synthesize(&SpeechRequest::new(words(10_000), VoiceId::Zephyr), None)
        .await
        .unwrap();

    assert_eq!(output.segments, 13);
    assert_eq!(synth.calls(), 13);
}

#[tokio::test]
async fn test_empty_text_makes_no_calls() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]));
    let pipeline = pipeline_with(synth.clone(), PipelineConfig::default());
    let recorder = Recorder::default();

    let result = pipeline
        .synthesize(&SpeechRequest::new("  \n ", VoiceId::Zephyr), Some(&recorder))
        .await;

    assert!(matches!(result, Err(TtsError::EmptyText)));
    assert_eq!(synth.calls(), 0);
    assert!(recorder.progress.lock().unwrap().is_empty());
    assert!(matches!(
        recorder.states.lock().unwrap().last(),
        Some(PipelineState::Failed { .. })
    ));
}

#[tokio::test]
async fn test_failure_mid_run_aborts_remaining_segments() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]).failing_at(1));
    let config = PipelineConfig {
        max_words_per_chunk: 1,
        ..Default::default()
    };
    let pipeline = pipeline_with(synth.clone(), config);

    let result = pipeline
        .synthesize(&SpeechRequest::new("alpha beta gamma", VoiceId::Fenrir), None)
        .await;

    match result {
        Err(TtsError::SynthesisCallFailed { segment, message }) => {
            assert_eq!(segment, 1);
            assert_eq!(message, "quota exceeded for segment 1");
        }
        other => panic!("expected SynthesisCallFailed, got {other:?}"),
    }
    // Segment 2 is never requested.
    assert_eq!(synth.calls(), 2);
}

#[tokio::test]
async fn test_empty_payload_is_a_call_failure() {
    let pipeline = SynthesisPipeline::new(Arc::new(EmptyPayload), PipelineConfig::default());
    let result = pipeline
        .synthesize(&SpeechRequest::new("hello", VoiceId::Zephyr), None)
        .await;
    assert!(matches!(result, Err(TtsError::SynthesisCallFailed { segment: 0, .. })));
}

#[tokio::test]
async fn test_odd_length_payload_is_malformed() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00, 0x01]));
    let pipeline = pipeline_with(synth, PipelineConfig::default());
    let result = pipeline
        .synthesize(&SpeechRequest::new("hello", VoiceId::Zephyr), None)
        .await;
    assert!(matches!(result, Err(TtsError::MalformedAudioData(_))));
}

#[tokio::test]
async fn test_standard_layout_reads_back_with_hound() {
    // 0, 16384, -16384, 32767
    let pcm = vec![0x00, 0x00, 0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F];
    let synth = Arc::new(FakeSynthesizer::new(pcm));
    let config = PipelineConfig {
        max_words_per_chunk: 1,
        wav: WavOptions {
            riff_size: RiffSize::Standard,
            ..Default::default()
        },
        ..Default::default()
    };
    let pipeline = pipeline_with(synth, config);

    let output = pipeline
        .synthesize(&SpeechRequest::new("two words", VoiceId::Zephyr), None)
        .await
        .unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(output.wav.into_inner())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 8);
    let expected = [0i16, 16384, -16384, 32767];
    for (got, want) in samples.iter().zip(expected.iter().chain(expected.iter())) {
        assert!((*got as i32 - *want as i32).abs() <= 1, "{got} vs {want}");
    }
}

#[tokio::test]
async fn test_event_stream_completes() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x40]));
    let config = PipelineConfig {
        max_words_per_chunk: 1,
        ..Default::default()
    };
    let pipeline = Arc::new(pipeline_with(synth, config));

    let events: Vec<SynthesisEvent> =
        synthesis_events(pipeline, SpeechRequest::new("a b", VoiceId::Kore))
            .collect()
            .await;

    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            SynthesisEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![0.0, 50.0, 100.0]);

    match events.last() {
        Some(SynthesisEvent::Completed(output)) => {
            assert_eq!(output.segments, 2);
            assert_eq!(output.metadata.frames, 2);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_event_stream_reports_failure() {
    let synth = Arc::new(FakeSynthesizer::new(vec![0x00, 0x00]).failing_at(0));
    let pipeline = Arc::new(pipeline_with(synth, PipelineConfig::default()));

    let events: Vec<SynthesisEvent> =
        synthesis_events(pipeline, SpeechRequest::new("hello", VoiceId::Kore))
            .collect()
            .await;

    assert!(matches!(
        events.last(),
        Some(SynthesisEvent::Failed(msg)) if msg == "quota exceeded for segment 0"
    ));
    assert!(!events.iter().any(|e| matches!(e, SynthesisEvent::Completed(_))));
}
