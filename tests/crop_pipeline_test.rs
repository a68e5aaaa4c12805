// tests/crop_pipeline_test.rs
//
// End-to-end runs of the crop pipeline: images on disk in, crops and
// annotated copies out, written to a save directory next to the sources.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use ndarray::Array3;
    use tempfile::TempDir;

    use plotkit::img_tools::cropper::{Cropper, CropperConfig};
    use plotkit::img_tools::raster;

    fn write_gradient(path: &Path, height: usize, width: usize) {
        let img = Array3::from_shape_fn((height, width, 3), |(r, c, _)| {
            (r * width + c) as f32 / (height * width - 1) as f32
        });
        raster::save_image(&img, path).unwrap();
    }

    #[test]
    fn boxes_crop_outline_and_overlap() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("photo.png");
        write_gradient(&photo, 8, 8);

        let config = CropperConfig {
            in_img: photo.to_string_lossy().into_owned(),
            boxes: vec![vec![1, 1, 5, 5], vec![0, 0, 3, 3]],
            colors: vec![String::from("r"), String::from("g")],
            overlap: true,
            ..CropperConfig::default()
        };
        Cropper::new(config).unwrap().run().unwrap();

        let roi = dir.path().join("ROI");
        println!("Crops in {}", roi.display());
        for name in [
            "photo_00_ROI.png",
            "photo_01_ROI.png",
            "photo_draw.png",
            "00_overlapped_img.png",
            "01_overlapped_img.png",
        ] {
            assert!(roi.join(name).exists(), "missing output '{name}'");
        }

        // Crop shapes follow the boxes: (1,1)-(5,5) and (0,0)-(3,3).
        let first = raster::read_image(&roi.join("photo_00_ROI.png")).unwrap();
        assert_eq!(first.dim(), (4, 4, 3));
        let second = raster::read_image(&roi.join("photo_01_ROI.png")).unwrap();
        assert_eq!(second.dim(), (3, 3, 3));
    }

    #[test]
    fn directory_input_filters_sorts_and_renames() {
        let dir = TempDir::new().unwrap();
        let shots = dir.path().join("shots");
        fs::create_dir(&shots).unwrap();
        write_gradient(&shots.join("night_02.png"), 6, 6);
        write_gradient(&shots.join("night_01.png"), 6, 6);
        write_gradient(&shots.join("day_01.png"), 6, 6);
        fs::write(shots.join("notes.txt"), "not an image\n").unwrap();

        let config = CropperConfig {
            in_dir: shots.to_string_lossy().into_owned(),
            key: String::from("night*"),
            top: 0,
            left: 0,
            height: 2,
            width: 2,
            rename: true,
            ..CropperConfig::default()
        };
        Cropper::new(config).unwrap().run().unwrap();

        // Two matching images, renamed by sorted position.
        let roi = shots.join("ROI");
        assert!(roi.join("00_ROI.png").exists());
        assert!(roi.join("01_ROI.png").exists());
        assert_eq!(fs::read_dir(&roi).unwrap().count(), 2);
    }

    #[test]
    fn arrows_without_boxes_save_only_the_annotated_copy() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("blank.png");
        raster::save_image(&Array3::from_elem((8, 8, 3), 1.0), &photo).unwrap();

        let config = CropperConfig {
            in_img: photo.to_string_lossy().into_owned(),
            arrows: vec![vec![1, 1, 6, 6]],
            arrow_color: vec![String::from("k")],
            ..CropperConfig::default()
        };
        Cropper::new(config).unwrap().run().unwrap();

        let roi = dir.path().join("ROI");
        assert!(roi.join("blank_draw.png").exists());
        assert_eq!(fs::read_dir(&roi).unwrap().count(), 1);

        // The black arrow put dark pixels onto the white canvas.
        let drawn = raster::read_image(&roi.join("blank_draw.png")).unwrap();
        let darkest = drawn.iter().cloned().fold(f32::INFINITY, f32::min);
        assert!(darkest < 0.5);
    }
}

// tests/crop_pipeline_test.rs
