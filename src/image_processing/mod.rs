pub mod compose;
pub mod crop;
pub mod orientation;

use anyhow::{Context, Result};
use image::{imageops, ImageFormat, RgbImage};
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fs_access::FileSystem;
use crate::utils::{has_valid_extension, verbose_println};
pub use crop::{CropMode, Orientation, OUTPUT_SIZE, TARGET_RATIO};

/// Name of the input subdirectory scanned below the batch root.
pub const RAW_SUBDIR: &str = "raw";

/// Accepted input extensions, matched case-insensitively.
pub const INPUT_EXTENSIONS: &[&str] = &["png", "jpg"];

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub mode: CropMode,
    pub parallel_jobs: usize,
    pub exif_rotate: bool,
    pub verbose: bool,
}

/// Outcome of one successfully processed input file.
#[derive(Debug)]
pub struct ProcessingResult {
    pub input_path: PathBuf,
    pub orientation: Orientation,
    pub output_paths: Vec<PathBuf>,
}

/// The directory outputs are written to: the batch root itself, one level
/// above the `raw` input subdirectory.
pub fn output_dir(root: &Path) -> PathBuf {
    root.to_path_buf()
}

pub struct ProcessingEngine<F: FileSystem> {
    config: ProcessingConfig,
    fs: F,
    pool: rayon::ThreadPool,
}

impl<F: FileSystem> ProcessingEngine<F> {
    /// Build the engine with its own scoped thread pool so batches from
    /// different engines never contend for a global pool.
    pub fn new(config: ProcessingConfig, fs: F) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_jobs)
            .build()
            .context("Failed to initialize thread pool")?;

        Ok(Self { config, fs, pool })
    }

    /// Discover eligible image files under `<root>/raw`, sorted for a stable
    /// processing order.
    pub fn discover_images(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let input_dir = root.join(RAW_SUBDIR);
        verbose_println(
            self.config.verbose,
            &format!("Scanning directory: {}", input_dir.display()),
        );

        let mut image_files: Vec<PathBuf> = self
            .fs
            .list_dir(&input_dir)?
            .into_iter()
            .filter(|path| has_valid_extension(path, INPUT_EXTENSIONS))
            .collect();
        image_files.sort();

        verbose_println(
            self.config.verbose,
            &format!("Found {} image files", image_files.len()),
        );
        Ok(image_files)
    }

    /// Process a batch of images in parallel.
    ///
    /// Results come back in input order. A failure is captured as the item's
    /// `Err` and never aborts sibling items; crops already written for a
    /// partially failed file are left in place.
    pub fn process_batch<P>(
        &self,
        image_files: &[PathBuf],
        output_dir: &Path,
        progress_callback: P,
    ) -> Vec<Result<ProcessingResult>>
    where
        P: Fn(usize) + Send + Sync,
    {
        let processed_count = AtomicUsize::new(0);

        self.pool.install(|| {
            image_files
                .par_iter()
                .map(|image_path| {
                    let result = self.process_single_image(image_path, output_dir);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    progress_callback(count);

                    result
                })
                .collect()
        })
    }

    /// Process one input file end to end: decode, plan crops, composite each
    /// onto a square canvas, resize and write.
    pub fn process_single_image(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<ProcessingResult> {
        verbose_println(
            self.config.verbose,
            &format!("Processing: {}", input_path.display()),
        );

        let bytes = self.fs.read(input_path)?;
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image: {}", input_path.display()))?;
        let mut rgb_img = decoded.to_rgb8();

        if self.config.exif_rotate {
            let exif_orientation = orientation::read_orientation(&bytes);
            rgb_img = orientation::apply_rotation(rgb_img, exif_orientation);
        }

        let (width, height) = rgb_img.dimensions();
        let image_orientation = Orientation::from_dimensions(width, height);
        let regions = crop::plan_crops(width, height, self.config.mode);

        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");

        let mut output_paths = Vec::with_capacity(regions.len());
        for region in regions {
            let cropped: RgbImage =
                imageops::crop_imm(&rgb_img, region.x, region.y, region.width, region.height)
                    .to_image();
            let square = compose::process_crop(&cropped)?;

            let output_path = output_dir.join(format!("{}{}.png", stem, region.suffix));
            let mut encoded = Vec::new();
            square
                .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
                .with_context(|| format!("Failed to encode PNG: {}", output_path.display()))?;
            self.fs.write_atomic(&output_path, &encoded)?;
            output_paths.push(output_path);
        }

        Ok(ProcessingResult {
            input_path: input_path.to_path_buf(),
            orientation: image_orientation,
            output_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_access::tests::MemoryFileSystem;
    use image::{ImageBuffer, Rgb};

    fn engine(mode: CropMode, fs: MemoryFileSystem) -> ProcessingEngine<MemoryFileSystem> {
        ProcessingEngine::new(
            ProcessingConfig {
                mode,
                parallel_jobs: 2,
                exif_rotate: false,
                verbose: false,
            },
            fs,
        )
        .unwrap()
    }

    fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    fn decode_output(fs: &MemoryFileSystem, path: &str) -> RgbImage {
        let bytes = fs.file(path).expect(path);
        image::load_from_memory(&bytes).unwrap().to_rgb8()
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let fs = MemoryFileSystem::new("/work");
        fs.add_file("/work/raw/b.jpg", vec![0]);
        fs.add_file("/work/raw/a.png", vec![0]);
        fs.add_file("/work/raw/C.PNG", vec![0]);
        fs.add_file("/work/raw/notes.txt", vec![0]);
        fs.add_file("/work/raw/anim.gif", vec![0]);

        let engine = engine(CropMode::All, fs);
        let files = engine.discover_images(Path::new("/work")).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("/work/raw/C.PNG"),
                PathBuf::from("/work/raw/a.png"),
                PathBuf::from("/work/raw/b.jpg"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_raw_dir_fails() {
        let engine = engine(CropMode::All, MemoryFileSystem::new("/work"));
        assert!(engine.discover_images(Path::new("/work")).is_err());
    }

    #[test]
    fn test_vertical_png_mode_all() {
        // Scenario: vertical image, mode 3 -> _S, _C, _E outputs at 512x512
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/img.png",
            encoded_image(10, 20, ImageFormat::Png),
        );

        let engine = engine(CropMode::All, fs);
        let result = engine
            .process_single_image(Path::new("/work/raw/img.png"), Path::new("/work"))
            .unwrap();

        assert_eq!(result.orientation, Orientation::Vertical);
        assert_eq!(
            result.output_paths,
            vec![
                PathBuf::from("/work/img_S.png"),
                PathBuf::from("/work/img_C.png"),
                PathBuf::from("/work/img_E.png"),
            ]
        );
        for name in ["/work/img_S.png", "/work/img_C.png", "/work/img_E.png"] {
            let out = decode_output(&engine.fs, name);
            assert_eq!(out.dimensions(), (OUTPUT_SIZE, OUTPUT_SIZE));
        }
    }

    #[test]
    fn test_horizontal_jpeg_center_only_converts_to_png() {
        // Scenario: horizontal JPEG, mode 1 -> single photo_C.png
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/photo.jpg",
            encoded_image(40, 20, ImageFormat::Jpeg),
        );

        let engine = engine(CropMode::CenterOnly, fs);
        let result = engine
            .process_single_image(Path::new("/work/raw/photo.jpg"), Path::new("/work"))
            .unwrap();

        assert_eq!(result.orientation, Orientation::Horizontal);
        assert_eq!(result.output_paths, vec![PathBuf::from("/work/photo_C.png")]);
        let out = decode_output(&engine.fs, "/work/photo_C.png");
        assert_eq!(out.dimensions(), (OUTPUT_SIZE, OUTPUT_SIZE));
    }

    #[test]
    fn test_square_input_writes_three_distinct_files() {
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/sq.png",
            encoded_image(16, 16, ImageFormat::Png),
        );

        let engine = engine(CropMode::All, fs);
        let result = engine
            .process_single_image(Path::new("/work/raw/sq.png"), Path::new("/work"))
            .unwrap();

        // Square counts as horizontal: _L, _C, _R with identical content
        assert_eq!(result.orientation, Orientation::Horizontal);
        assert_eq!(result.output_paths.len(), 3);
        let left = decode_output(&engine.fs, "/work/sq_L.png");
        let center = decode_output(&engine.fs, "/work/sq_C.png");
        assert_eq!(left, center);
    }

    #[test]
    fn test_edges_mode_output_count() {
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/img.png",
            encoded_image(8, 24, ImageFormat::Png),
        );

        let engine = engine(CropMode::Edges, fs);
        let result = engine
            .process_single_image(Path::new("/work/raw/img.png"), Path::new("/work"))
            .unwrap();

        assert_eq!(
            result.output_paths,
            vec![
                PathBuf::from("/work/img_S.png"),
                PathBuf::from("/work/img_E.png"),
            ]
        );
    }

    #[test]
    fn test_batch_isolates_corrupt_file() {
        // Scenario: one unreadable file among valid ones -> siblings succeed
        let fs = MemoryFileSystem::new("/work");
        for name in ["a", "b", "d", "e"] {
            fs.add_file(
                format!("/work/raw/{}.png", name),
                encoded_image(6, 12, ImageFormat::Png),
            );
        }
        fs.add_file("/work/raw/c.png", b"not an image at all".to_vec());

        let engine = engine(CropMode::CenterOnly, fs);
        let files = engine.discover_images(Path::new("/work")).unwrap();
        assert_eq!(files.len(), 5);

        let results = engine.process_batch(&files, Path::new("/work"), |_| {});

        let successful = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successful, 4);
        // Order matches the input order, so the corrupt file is result #2
        assert!(results[2].is_err());
        let message = format!("{:#}", results[2].as_ref().unwrap_err());
        assert!(message.contains("/work/raw/c.png"), "{}", message);
    }

    #[test]
    fn test_batch_reports_progress_for_every_item() {
        let fs = MemoryFileSystem::new("/work");
        for name in ["a", "b", "c"] {
            fs.add_file(
                format!("/work/raw/{}.png", name),
                encoded_image(6, 6, ImageFormat::Png),
            );
        }

        let engine = engine(CropMode::CenterOnly, fs);
        let files = engine.discover_images(Path::new("/work")).unwrap();

        let seen = AtomicUsize::new(0);
        engine.process_batch(&files, Path::new("/work"), |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/img.png",
            encoded_image(9, 21, ImageFormat::Png),
        );

        let engine = engine(CropMode::All, fs);
        engine
            .process_single_image(Path::new("/work/raw/img.png"), Path::new("/work"))
            .unwrap();
        let first = decode_output(&engine.fs, "/work/img_C.png");

        engine
            .process_single_image(Path::new("/work/raw/img.png"), Path::new("/work"))
            .unwrap();
        let second = decode_output(&engine.fs, "/work/img_C.png");

        assert_eq!(first, second);
    }

    #[test]
    fn test_exif_rotate_off_keeps_buffer_orientation() {
        let fs = MemoryFileSystem::new("/work");
        fs.add_file(
            "/work/raw/img.jpg",
            encoded_image(30, 10, ImageFormat::Jpeg),
        );

        let engine = engine(CropMode::CenterOnly, fs);
        let result = engine
            .process_single_image(Path::new("/work/raw/img.jpg"), Path::new("/work"))
            .unwrap();
        assert_eq!(result.orientation, Orientation::Horizontal);
    }
}
