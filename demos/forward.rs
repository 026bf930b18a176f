/// Runs one forward pass of the LeNet classifier.
///
/// A zero-initialized network maps an all-zero image to all-zero logits;
/// a seeded network with the default init gives reproducible scores.
///
/// Run with:
///   cargo run --example forward

use lenet::{Cnn, InitConfig, InitScheme, Tensor};

fn main() -> lenet::Result<()> {
    let image = Tensor::zeros([1, 1, 28, 28])?;

    let zeroed = Cnn::from_config(&InitConfig::seeded(InitScheme::Zeros, 0));
    let logits = zeroed.forward(&image)?;
    println!("zero network, zero image: {:?}", logits.data[0]);

    let cnn = Cnn::from_config(&InitConfig::seeded(InitScheme::FanInUniform, 42));
    println!("parameters: {}", cnn.num_parameters());
    for layer in cnn.summary() {
        println!("  {}", layer);
    }

    let batch = Tensor::stack(&[image.clone(), image.map(|_| 1.0)])?;
    let logits = cnn.forward(&batch)?;
    for (i, (row, class)) in logits.data.iter().zip(logits.argmax_rows()).enumerate() {
        let scores: Vec<String> = row.iter().map(|v| format!("{:+.4}", v)).collect();
        println!("sample {}: class {}  [{}]", i, class, scores.join(", "));
    }

    Ok(())
}
