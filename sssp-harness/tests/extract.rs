use sssp_harness::sweep::{
    extract::DEFAULT_PATTERN, ExtractError, Extractor, PatternExtractor, SampleExtractor,
    ShortSamples, TrimmedMean,
};

fn output(samples: &[&str]) -> String {
    samples
        .iter()
        .enumerate()
        .map(|(i, t)| format!("run {}\nВремя работы реализация: {} секунд\n", i, t))
        .collect()
}

#[test]
fn test_trimmed_mean_drops_outliers() -> anyhow::Result<()> {
    let out = output(&[
        "5.000000", "1.000000", "9.000000", "2.000000", "8.000000", "3.000000", "7.000000",
        "4.000000", "6.000000",
    ]);
    assert_eq!(Extractor::default().extract(&out)?, 5.0);
    // Spikes on both ends do not move the mean
    let out = output(&[
        "1000.0", "0.0001", "5.0", "5.0", "5.0", "5.0", "5.0", "9999.0", "0.0",
    ]);
    assert_eq!(Extractor::default().extract(&out)?, 5.0);
    Ok(())
}

#[test]
fn test_noise_is_ignored() {
    let out = "Graph loaded\nреализация: abc секунд\nреализация: 1.5 секунд\nTotal: 3.0 seconds\n";
    let samples = PatternExtractor::default().samples(out);
    assert_eq!(samples, vec![1.5]);
}

#[test]
fn test_no_samples() {
    let err = Extractor::default().extract("Segmentation fault\n").unwrap_err();
    assert_eq!(err, ExtractError::NoSamples);
}

#[test]
fn test_short_samples() {
    let out = output(&["1.0", "2.0", "6.0"]);
    let mean = Extractor::default().extract(&out).unwrap();
    assert_eq!(mean, 3.0);
    let reject = TrimmedMean {
        short: ShortSamples::Reject,
        ..TrimmedMean::default()
    };
    let extractor = Extractor::new(PatternExtractor::default(), reject);
    assert_eq!(
        extractor.extract(&out),
        Err(ExtractError::InsufficientSamples {
            found: 3,
            required: 5
        })
    );
}

#[test]
fn test_required_samples() {
    assert_eq!(TrimmedMean::default().required(), 5);
    let wide = TrimmedMean {
        trim: 4,
        ..TrimmedMean::default()
    };
    assert_eq!(wide.required(), 9);
    // Exactly enough samples: one survives the trim
    assert_eq!(wide.reduce(vec![9.0, 1.0, 8.0, 2.0, 5.0, 7.0, 3.0, 6.0, 4.0]), Ok(5.0));
    let none = TrimmedMean {
        trim: 0,
        min_samples: 1,
        short: ShortSamples::Reject,
    };
    assert_eq!(none.reduce(vec![2.0, 4.0]), Ok(3.0));
}

#[test]
fn test_custom_pattern() -> anyhow::Result<()> {
    let extractor = Extractor::new(
        PatternExtractor::new(r"elapsed=(\d+\.\d+)s")?,
        TrimmedMean::default(),
    );
    let out = "elapsed=1.0s\nelapsed=2.0s\nelapsed=3.0s\nelapsed=4.0s\nelapsed=5.0s\n";
    assert_eq!(extractor.extract(out)?, 3.0);
    assert!(matches!(
        PatternExtractor::new(r"elapsed=\d+"),
        Err(ExtractError::InvalidPattern(_))
    ));
    assert!(matches!(
        PatternExtractor::new(r"elapsed=(\d+"),
        Err(ExtractError::InvalidPattern(_))
    ));
    assert_eq!(PatternExtractor::default().as_str(), DEFAULT_PATTERN);
    Ok(())
}
