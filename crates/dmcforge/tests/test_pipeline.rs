//! End-to-end tests: notes and audio in, instrument bytes out.

use dmcforge::dpcm::{decode_bias, encode, pack_bits, unpack_bits};
use dmcforge::note::parse_note_list;
use dmcforge::resample::resample_nearest;
use dmcforge::tuning::{analyze, patch_bytes, patch_samples};
use dmcforge::wav::{read_wav, write_pcm_wav};
use dmcforge::{
    generate_instrument, repitch_instrument, split_recording, FtiInstrument, GeneratorConfig,
    HardwareTables, RepitchConfig, SplitConfig, Waveform,
};

#[test]
fn test_a4_tuning_scenario() {
    assert_eq!(patch_bytes(1), 17);
    assert_eq!(patch_samples(1), 136);

    let table = analyze(440.0, 33144.0, 255);
    let l1 = table
        .candidates
        .iter()
        .find(|c| c.length_index == 1)
        .unwrap();
    let period = 1.0 / 440.0;
    let expected_offset = ((136.0 / 33144.0) % period) * 440.0;
    assert_eq!(l1.phase_offset, expected_offset);
    assert_eq!(l1.tuning_error, 0.5 - (expected_offset - 0.5).abs());
}

#[test]
fn test_select_smallest_never_fails() {
    let table = analyze(440.0, 33144.0, 255);
    for threshold in [-1.0, 0.0, 0.001, 0.1, 0.6] {
        let choice = table.select_smallest(threshold);
        assert!(table.candidates.contains(&choice.candidate));
    }
}

#[test]
fn test_nearest_resample_scenario() {
    let source: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert_eq!(
        resample_nearest(&source, 2.0).unwrap(),
        vec![0.0, 2.0, 4.0, 6.0, 8.0]
    );
}

#[test]
fn test_pack_unpack_law() {
    let bits: Vec<bool> = (0..256).map(|i| (i * 31 + 7) % 3 == 0).collect();
    assert_eq!(unpack_bits(&pack_bits(&bits)), bits);
}

#[test]
fn test_mid_range_bias_stays_small() {
    let pcm = vec![128.0; 1000];
    let bytes = encode(&pcm, None).unwrap();
    assert_eq!(bytes.len(), 125);
    assert!(decode_bias(&bytes).abs() <= 2);
}

#[test]
fn test_generated_instrument_roundtrips() {
    let notes = parse_note_list("as2-d3").unwrap();
    let config = GeneratorConfig {
        name: "DPCM sunsaw".to_string(),
        error_threshold: 0.02,
        ..Default::default()
    };
    let result = generate_instrument(
        &Waveform::Sawtooth,
        &notes,
        &config,
        &HardwareTables::default(),
    )
    .unwrap();

    assert_eq!(result.reports.len(), 5);
    assert!(result.filled > 0);
    assert_eq!(
        result.instrument.mappings.len(),
        result.reports.len() + result.filled
    );

    let bytes = result.instrument.to_bytes().unwrap();
    let read = FtiInstrument::from_bytes(&bytes).unwrap();
    assert_eq!(read, result.instrument);
    for mapping in &read.mappings {
        assert!(mapping.note > 12);
        assert!(read.sample_for(mapping).is_some());
    }
}

#[test]
fn test_generation_is_deterministic() {
    let notes = parse_note_list("c4,e4,g4").unwrap();
    let run = || {
        generate_instrument(
            &Waveform::Sine,
            &notes,
            &GeneratorConfig::default(),
            &HardwareTables::default(),
        )
        .unwrap()
        .instrument
        .compute_hash()
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_wav_to_repitched_instrument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.wav");
    let pcm: Vec<f64> = (0..22050)
        .map(|i| 128.0 + 96.0 * (i as f64 * 261.63 * std::f64::consts::TAU / 22050.0).sin())
        .collect();
    write_pcm_wav(&path, &pcm, 22050).unwrap();

    let clip = read_wav(&path).unwrap();
    let notes = parse_note_list("c4,g4").unwrap();
    let result = repitch_instrument(
        &clip,
        &notes,
        &RepitchConfig::default(),
        &HardwareTables::default(),
    )
    .unwrap();

    assert_eq!(result.instrument.samples.len(), 2);
    assert!(result.instrument.samples[0].data.len() <= 4081);
    // one second at C4 needs more than 4081 bytes at the fastest rate, G4 does not
    assert!(result.reports[0].truncated);
    assert!(!result.reports[1].truncated);

    let out = dir.path().join("out.fti");
    std::fs::write(&out, result.instrument.to_bytes().unwrap()).unwrap();
    let read = FtiInstrument::from_bytes(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(read.mappings[0].delta_counter, 32);
}

#[test]
fn test_split_chunks_are_valid_dmc_lengths() {
    let clip = dmcforge::wav::PcmClip {
        samples: (0..40000).map(|i| 128.0 + 50.0 * (i as f64 * 0.02).sin()).collect(),
        sample_rate: 44100,
    };
    let config = SplitConfig {
        seconds: 0.2,
        ..Default::default()
    };
    let result = split_recording(&clip, &config, &HardwareTables::default()).unwrap();
    for chunk in &result.chunks {
        assert_eq!((chunk.len() - 1) % 16, 0);
    }
    assert!(result.instrument.to_bytes().is_ok());
}
