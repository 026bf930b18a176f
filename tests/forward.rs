use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use lenet::{Cnn, Error, InitConfig, InitScheme, Tensor};

fn seeded_cnn(seed: u64) -> Cnn {
    Cnn::from_config(&InitConfig::seeded(InitScheme::FanInUniform, seed))
}

fn random_batch(n: usize, channels: usize, side: usize, seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..n * channels * side * side).map(|_| rng.gen::<f64>()).collect();
    Tensor::from_vec([n, channels, side, side], data).unwrap()
}

#[test]
fn output_is_batch_by_ten() {
    let cnn = seeded_cnn(1);
    for n in [1, 2, 5] {
        let logits = cnn.forward(&random_batch(n, 1, 28, n as u64)).unwrap();
        assert_eq!(logits.shape(), (n, 10));
        assert!(logits.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn relu_outputs_are_non_negative() {
    let cnn = Cnn::from_config(&InitConfig::seeded(InitScheme::He, 3));
    let trace = cnn.forward_trace(&random_batch(3, 1, 28, 9)).unwrap();
    for (name, values) in trace.relu_outputs() {
        assert!(values.iter().all(|&v| v >= 0.0), "{} has negative activations", name);
    }
    // pooling keeps values drawn from non-negative maps
    assert!(trace.pool1.iter().all(|&v| v >= 0.0));
    assert!(trace.pool2.iter().all(|&v| v >= 0.0));
}

#[test]
fn logits_are_not_clipped() {
    // With random weights at least one logit across the batch goes negative,
    // which shows no activation follows fc3.
    let cnn = seeded_cnn(21);
    let logits = cnn.forward(&random_batch(8, 1, 28, 4)).unwrap();
    assert!(logits.iter().any(|&v| v < 0.0));
}

#[test]
fn forward_is_deterministic() {
    let cnn = seeded_cnn(7);
    let x = random_batch(4, 1, 28, 11);
    let a = cnn.forward(&x).unwrap();
    let b = cnn.forward(&x).unwrap();
    assert_eq!(a, b);
}

#[test]
fn same_seed_same_network() {
    let x = random_batch(2, 1, 28, 12);
    let a = seeded_cnn(99).forward(&x).unwrap();
    let b = seeded_cnn(99).forward(&x).unwrap();
    assert_eq!(a, b);
    let c = seeded_cnn(100).forward(&x).unwrap();
    assert_ne!(a, c);
}

#[test]
fn shared_across_threads() {
    let cnn = seeded_cnn(5);
    let x = random_batch(2, 1, 28, 6);
    let expected = cnn.forward(&x).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| cnn.forward(&x).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn wrong_channel_count_fails() {
    let cnn = seeded_cnn(2);
    let err = cnn.forward(&Tensor::zeros([2, 3, 28, 28]).unwrap()).unwrap_err();
    assert!(err.is_shape_mismatch(), "unexpected error: {}", err);
}

#[test]
fn wrong_spatial_size_fails_before_fc1() {
    let cnn = seeded_cnn(2);
    let err = cnn.forward(&Tensor::zeros([2, 1, 32, 32]).unwrap()).unwrap_err();
    match err {
        Error::ShapeMismatch { op, actual, .. } => {
            assert_eq!(op, "dense");
            assert!(actual.contains("576"), "{}", actual);
        }
        other => panic!("expected shape mismatch, got {}", other),
    }
}

#[test]
fn tiny_input_fails() {
    let cnn = seeded_cnn(2);
    assert!(cnn.forward(&Tensor::zeros([1, 1, 4, 4]).unwrap()).unwrap_err().is_shape_mismatch());
}

#[test]
fn zero_weights_zero_input_gives_zero_logits() {
    let cnn = Cnn::from_config(&InitConfig::seeded(InitScheme::Zeros, 0));
    let logits = cnn.forward(&Tensor::zeros([1, 1, 28, 28]).unwrap()).unwrap();
    assert_eq!(logits.shape(), (1, 10));
    assert!(logits.iter().all(|&v| v == 0.0));
}

#[test]
fn zeroing_parameters_after_init_gives_zero_logits() {
    let mut cnn = seeded_cnn(8);
    for (_, params) in cnn.parameters_mut() {
        for p in params {
            *p = 0.0;
        }
    }
    let logits = cnn.forward(&random_batch(1, 1, 28, 1)).unwrap();
    assert!(logits.iter().all(|&v| v == 0.0));
}

#[test]
fn default_init_is_bounded_by_fan_in() {
    let cnn = seeded_cnn(13);
    let bounds = [
        ("conv1", 1.0 / 25.0_f64.sqrt()),
        ("conv2", 1.0 / 150.0_f64.sqrt()),
        ("fc1", 1.0 / 400.0_f64.sqrt()),
        ("fc2", 1.0 / 120.0_f64.sqrt()),
        ("fc3", 1.0 / 84.0_f64.sqrt()),
    ];
    for (name, params) in cnn.parameters() {
        let layer = name.split('.').next().unwrap();
        let bound = bounds.iter().find(|(l, _)| *l == layer).unwrap().1;
        assert!(params.iter().all(|p| p.abs() <= bound), "{} out of bounds", name);
    }
}

#[test]
fn bias_only_network_passes_bias_through_fc3() {
    let mut cnn = Cnn::from_config(&InitConfig::seeded(InitScheme::Zeros, 0));
    cnn.fc3.biases.data[0] = (0..10).map(|i| i as f64 - 4.5).collect();
    let logits = cnn.forward(&random_batch(2, 1, 28, 3)).unwrap();
    for row in &logits.data {
        for (i, v) in row.iter().enumerate() {
            assert_relative_eq!(*v, i as f64 - 4.5);
        }
    }
    assert_eq!(cnn.predict(&random_batch(2, 1, 28, 3)).unwrap(), vec![9, 9]);
}

#[test]
fn short_deserialized_tensor_never_reaches_forward() {
    let parsed = serde_json::from_str::<Tensor>(r#"{"shape":[1,1,28,28],"data":[0.0]}"#);
    assert!(parsed.is_err());

    let cnn = seeded_cnn(4);
    let json = serde_json::to_string(&random_batch(1, 1, 28, 2)).unwrap();
    let x: Tensor = serde_json::from_str(&json).unwrap();
    assert_eq!(cnn.forward(&x).unwrap().shape(), (1, 10));
}

#[test]
fn huge_batch_shape_is_rejected_up_front() {
    let err = Tensor::from_vec([usize::MAX, 2, 1, 1], vec![]).unwrap_err();
    assert!(err.is_shape_mismatch(), "unexpected error: {}", err);
}
