use imlab::degrade::{self, FileOutcome, DEGRADATIONS};
use imlab::image::Image;
use imlab::io::functional::{read_image_rgb8, write_image_rgb8};
use imlab::params::DegradeParams;
use imlab::{CancellationToken, Error};

fn gradient_image(width: usize, height: usize) -> Result<Image<u8, 3>, Error> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x * 2) as u8, (y * 2) as u8, 128]);
        }
    }
    Ok(Image::new([width, height].into(), data)?)
}

fn seeded() -> DegradeParams {
    DegradeParams {
        seed: Some(42),
        ..Default::default()
    }
}

#[test]
fn writes_five_variants() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;

    write_image_rgb8(input_dir.path().join("scene.png"), &gradient_image(100, 100)?)?;

    let report = degrade::run_batch(
        input_dir.path(),
        output_dir.path(),
        &seeded(),
        &CancellationToken::new(),
    )?;

    assert!(!report.cancelled);
    assert_eq!(report.num_processed(), 1);

    let FileOutcome::Processed { outputs, .. } = &report.outcomes[0] else {
        panic!("scene.png was not processed: {:?}", report.outcomes[0]);
    };
    assert_eq!(outputs.len(), DEGRADATIONS.len());

    for name in DEGRADATIONS {
        let path = output_dir.path().join(format!("scene_{name}.jpg"));
        assert!(outputs.contains(&path), "missing {}", path.display());

        let variant = read_image_rgb8(&path)?;
        assert_eq!(variant.width(), 100);
        assert_eq!(variant.height(), 100);
    }

    Ok(())
}

#[test]
fn creates_output_dir() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let root = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = root.path().join("nested").join("out");

    write_image_rgb8(input_dir.path().join("a.bmp"), &gradient_image(8, 6)?)?;

    let report = degrade::run_batch(
        input_dir.path(),
        &output_dir,
        &seeded(),
        &CancellationToken::new(),
    )?;

    assert_eq!(report.num_processed(), 1);
    assert!(output_dir.join("a_dark.jpg").is_file());

    Ok(())
}

#[test]
fn skips_corrupted_files() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;

    std::fs::write(input_dir.path().join("a_broken.jpg"), b"not a jpeg")
        .map_err(imlab::io::IoError::from)?;
    std::fs::write(input_dir.path().join("notes.txt"), b"ignored")
        .map_err(imlab::io::IoError::from)?;
    write_image_rgb8(input_dir.path().join("b_good.png"), &gradient_image(10, 10)?)?;

    let report = degrade::run_batch(
        input_dir.path(),
        output_dir.path(),
        &seeded(),
        &CancellationToken::new(),
    )?;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.num_failed(), 1);
    assert_eq!(report.num_processed(), 1);

    assert!(matches!(&report.outcomes[0], FileOutcome::Failed { .. }));
    assert!(report.outcomes[0].input().ends_with("a_broken.jpg"));
    assert!(report.outcomes[1].input().ends_with("b_good.png"));

    assert!(!output_dir.path().join("a_broken_noisy.jpg").exists());
    assert!(output_dir.path().join("b_good_noisy.jpg").is_file());

    Ok(())
}

#[test]
fn removes_partial_outputs() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;

    write_image_rgb8(input_dir.path().join("a.png"), &gradient_image(10, 10)?)?;
    write_image_rgb8(input_dir.path().join("b.png"), &gradient_image(10, 10)?)?;

    // a directory in place of the third variant makes that write fail
    std::fs::create_dir(output_dir.path().join("a_low_contrast.jpg"))
        .map_err(imlab::io::IoError::from)?;

    let report = degrade::run_batch(
        input_dir.path(),
        output_dir.path(),
        &seeded(),
        &CancellationToken::new(),
    )?;

    assert!(matches!(&report.outcomes[0], FileOutcome::Failed { .. }));
    assert_eq!(report.num_processed(), 1);

    assert!(!output_dir.path().join("a_noisy.jpg").exists());
    assert!(!output_dir.path().join("a_blurred.jpg").exists());
    assert!(!output_dir.path().join("a_dark.jpg").exists());
    for name in DEGRADATIONS {
        assert!(output_dir.path().join(format!("b_{name}.jpg")).is_file());
    }

    Ok(())
}

#[test]
fn cancelled_before_start() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;

    write_image_rgb8(input_dir.path().join("a.png"), &gradient_image(10, 10)?)?;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = degrade::run_batch(input_dir.path(), output_dir.path(), &seeded(), &cancel)?;

    assert!(report.cancelled);
    assert!(report.outcomes.is_empty());
    assert!(!output_dir.path().join("a_noisy.jpg").exists());

    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let first = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let second = tempfile::tempdir().map_err(imlab::io::IoError::from)?;

    write_image_rgb8(input_dir.path().join("a.png"), &gradient_image(20, 20)?)?;

    let cancel = CancellationToken::new();
    degrade::run_batch(input_dir.path(), first.path(), &seeded(), &cancel)?;
    degrade::run_batch(input_dir.path(), second.path(), &seeded(), &cancel)?;

    let noisy_first = read_image_rgb8(first.path().join("a_noisy.jpg"))?;
    let noisy_second = read_image_rgb8(second.path().join("a_noisy.jpg"))?;
    assert_eq!(noisy_first, noisy_second);

    Ok(())
}

#[test]
fn rejects_invalid_params() -> Result<(), Error> {
    let input_dir = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let root = tempfile::tempdir().map_err(imlab::io::IoError::from)?;
    let output_dir = root.path().join("out");

    let params = DegradeParams {
        noise_sigma: 150.0,
        ..Default::default()
    };
    let res = degrade::run_batch(
        input_dir.path(),
        &output_dir,
        &params,
        &CancellationToken::new(),
    );

    assert!(matches!(
        res,
        Err(Error::InvalidParameter {
            name: "noise_sigma",
            ..
        })
    ));
    assert!(!output_dir.exists());

    Ok(())
}

#[test]
fn missing_input_dir() {
    let res = degrade::run_batch(
        "does/not/exist",
        "does/not/matter",
        &seeded(),
        &CancellationToken::new(),
    );
    assert!(matches!(res, Err(Error::Io(_))));
}
