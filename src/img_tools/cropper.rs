// src/img_tools/cropper.rs

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ndarray::Array3;

use crate::error::PlotError;
use crate::img_tools::raster;
use crate::types::PlotResult;

// Batch crop-and-annotate pipeline: list images, decode and normalize,
// draw arrows and box outlines, cut out the boxes, save crops next to the
// source images. The first failing image or box aborts the whole run.

/// Crop corners. `bottom` and `right` are exclusive slice ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub top: i64,
    pub left: i64,
    pub bottom: i64,
    pub right: i64,
}

/// Arrow endpoints in (x, y) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    pub from_x: i64,
    pub from_y: i64,
    pub to_x: i64,
    pub to_y: i64,
}

/// Cropper settings as they arrive from the command line. `boxes` and
/// `arrows` hold one four-value group per flag occurrence.
#[derive(Debug, Clone)]
pub struct CropperConfig {
    pub in_dir: String,
    pub in_img: String,
    pub key: String,
    pub img_type: Vec<String>,
    pub top: i64,
    pub left: i64,
    pub bottom: i64,
    pub right: i64,
    pub height: i64,
    pub width: i64,
    pub boxes: Vec<Vec<i64>>,
    pub colors: Vec<String>,
    pub thick: i64,
    pub arrows: Vec<Vec<i64>>,
    pub arrow_thick: i64,
    pub arrow_color: Vec<String>,
    pub keep_alpha: bool,
    pub do_gamma: bool,
    pub gamma: f32,
    pub do_iscale: bool,
    pub iscale: f32,
    pub overlap: bool,
    pub save_ext: String,
    pub save_dir: String,
    pub rename: bool,
}

impl Default for CropperConfig {
    fn default() -> Self {
        CropperConfig {
            in_dir: String::new(),
            in_img: String::new(),
            key: String::from("*"),
            img_type: vec![
                String::from(".jpg"),
                String::from(".png"),
                String::from(".tif"),
            ],
            top: -1,
            left: -1,
            bottom: -1,
            right: -1,
            height: -1,
            width: -1,
            boxes: Vec::new(),
            colors: Vec::new(),
            thick: 2,
            arrows: Vec::new(),
            arrow_thick: 2,
            arrow_color: Vec::new(),
            keep_alpha: false,
            do_gamma: false,
            gamma: 2.2,
            do_iscale: false,
            iscale: 2.57,
            overlap: false,
            save_ext: String::from(".png"),
            save_dir: String::from("ROI"),
            rename: false,
        }
    }
}

impl CropperConfig {
    /// Prints the settings, one per line, before validation.
    pub fn describe(&self) {
        println!("\tin_dir: '{}'", self.in_dir);
        println!("\tin_img: '{}'", self.in_img);
        println!("\tkey: '{}'", self.key);
        println!("\timg_type: {:?}", self.img_type);
        println!(
            "\tbox: ({}, {}, {}, {}), height: {}, width: {}",
            self.top, self.left, self.bottom, self.right, self.height, self.width
        );
        println!("\tboxes: {:?}", self.boxes);
        println!("\tcolors: {:?}, thick: {}", self.colors, self.thick);
        println!(
            "\tarrows: {:?}, arrow_color: {:?}, arrow_thick: {}",
            self.arrows, self.arrow_color, self.arrow_thick
        );
        println!(
            "\tkeep_alpha: {}, do_gamma: {} (gamma {}), do_iscale: {} (iscale {})",
            self.keep_alpha, self.do_gamma, self.gamma, self.do_iscale, self.iscale
        );
        println!(
            "\toverlap: {}, save_ext: '{}', save_dir: '{}', rename: {}",
            self.overlap, self.save_ext, self.save_dir, self.rename
        );
    }
}

pub struct Cropper {
    config: CropperConfig,
    boxes: Vec<CropBox>,
    arrows: Vec<Arrow>,
}

impl Cropper {
    /// Validates the settings and resolves the box and arrow lists.
    pub fn new(config: CropperConfig) -> PlotResult<Cropper> {
        config.describe();
        if config.in_dir.is_empty() && config.in_img.is_empty() {
            return Err(PlotError::config(
                "at least one of in_dir and in_img must be set",
            ));
        }
        let boxes = resolve_boxes(&config)?;
        if !config.colors.is_empty() && config.colors.len() != boxes.len() {
            return Err(PlotError::config(format!(
                "the color count must be zero or match the box count ({} boxes, {} colors)",
                boxes.len(),
                config.colors.len()
            )));
        }
        println!("Found {} boxes", boxes.len());
        let arrows = resolve_arrows(&config)?;
        Ok(Cropper {
            config,
            boxes,
            arrows,
        })
    }

    /// Processes every selected image. Crops land in a `save_dir`
    /// subdirectory next to each source image; with `overlap`, the crops
    /// of each box are mean-blended across images at the end.
    pub fn run(&self) -> PlotResult<()> {
        let images = self.list_images()?;
        let mut caches: Vec<Vec<Array3<f32>>> = vec![Vec::new(); self.boxes.len()];
        let mut last_save_dir: Option<PathBuf> = None;

        for (image_index, path) in images.iter().enumerate() {
            let decoded = raster::read_image(path)?;
            let mut img = raster::normalize_channels(decoded, self.config.keep_alpha);
            if self.config.do_iscale {
                raster::apply_intensity_scale(&mut img, self.config.iscale);
            }
            if self.config.do_gamma {
                raster::apply_gamma(&mut img, self.config.gamma);
            }
            let (height, width, _) = img.dim();

            for (arrow, color_name) in self.arrows.iter().zip(&self.config.arrow_color) {
                let color = raster::outline_color(color_name)?;
                raster::draw_arrow(
                    &mut img,
                    (arrow.from_x, arrow.from_y),
                    (arrow.to_x, arrow.to_y),
                    color,
                    self.config.arrow_thick,
                )?;
            }

            let save_dir = self.save_dir_for(path);
            fs::create_dir_all(&save_dir)?;

            for (box_index, corner) in self.boxes.iter().enumerate() {
                raster::check_box(&img, corner.top, corner.left, corner.bottom, corner.right)?;
                println!(
                    "[Image {}/{}] [Box {}/{}] {}: {} X {}, crop: {} X {}",
                    image_index + 1,
                    images.len(),
                    box_index + 1,
                    self.boxes.len(),
                    path.display(),
                    height,
                    width,
                    corner.bottom - corner.top,
                    corner.right - corner.left
                );
                // Outlines are drawn onto the working image, so later
                // crops include the outlines of earlier boxes.
                if !self.config.colors.is_empty() {
                    let color = raster::outline_color(&self.config.colors[box_index])?;
                    raster::draw_rectangle(
                        &mut img,
                        corner.top,
                        corner.left,
                        corner.bottom,
                        corner.right,
                        color,
                        self.config.thick,
                    );
                }
                let cropped =
                    raster::crop(&img, corner.top, corner.left, corner.bottom, corner.right)?;
                let name = self.crop_name(path, image_index, box_index);
                raster::save_image(&cropped, &save_dir.join(name))?;
                if self.config.overlap {
                    caches[box_index].push(cropped);
                }
            }

            if !self.arrows.is_empty() || (!self.boxes.is_empty() && !self.config.colors.is_empty())
            {
                let drawn = format!("{}_draw{}", image_stem(path), self.config.save_ext);
                raster::save_image(&img, &save_dir.join(drawn))?;
            }
            last_save_dir = Some(save_dir);
        }

        if self.config.overlap {
            let save_dir = match last_save_dir {
                Some(dir) => dir,
                None => {
                    return Err(PlotError::data(
                        "no images were processed, nothing to overlap",
                    ))
                }
            };
            for (box_index, crops) in caches.iter().enumerate() {
                let blended = raster::blend_mean(crops)?;
                let name = format!("{:02}_overlapped_img{}", box_index, self.config.save_ext);
                raster::save_image(&blended, &save_dir.join(name))?;
            }
        }
        Ok(())
    }

    fn list_images(&self) -> PlotResult<Vec<PathBuf>> {
        let mut names: Vec<PathBuf> = if !self.config.in_dir.is_empty() {
            println!("Input dir: {}", self.config.in_dir);
            let mut found = Vec::new();
            for entry in fs::read_dir(&self.config.in_dir)? {
                let entry = entry?;
                let file_name = entry.file_name();
                if let Some(name) = file_name.to_str() {
                    if wildcard_match(&self.config.key, name) {
                        found.push(entry.path());
                    }
                }
            }
            found
        } else {
            println!("Input image: {}", self.config.in_img);
            vec![PathBuf::from(&self.config.in_img)]
        };
        // The suffix filter also applies to a single named image.
        names.retain(|path| self.is_image_file(path));
        names.sort();
        println!("Found {} images", names.len());
        Ok(names)
    }

    fn is_image_file(&self, path: &Path) -> bool {
        if path.is_dir() {
            return false;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.config.img_type.iter().any(|ext| name.ends_with(ext.as_str())),
            None => false,
        }
    }

    fn save_dir_for(&self, image_path: &Path) -> PathBuf {
        let parent = image_path.parent().unwrap_or(Path::new(""));
        parent.join(&self.config.save_dir)
    }

    // Crop file name: a zero-padded image index under `rename`, else the
    // source stem; a box index when there is more than one box; then the
    // shared suffix.
    fn crop_name(&self, image_path: &Path, image_index: usize, box_index: usize) -> String {
        let multiple = self.boxes.len() > 1;
        let base = if self.config.rename {
            if multiple {
                format!("{:02}_{:02}", image_index, box_index)
            } else {
                format!("{:02}", image_index)
            }
        } else if multiple {
            format!("{}_{:02}", image_stem(image_path), box_index)
        } else {
            image_stem(image_path)
        };
        format!("{}_{}", base, self.save_suffix())
    }

    // Suffix records the processing applied: save_dir tag, then gamma and
    // intensity-scale markers, then the extension.
    fn save_suffix(&self) -> String {
        let mut suffix = self.config.save_dir.clone();
        if self.config.do_gamma {
            suffix.push_str("_gamma");
        }
        if self.config.do_iscale {
            suffix.push_str("_iscale");
        }
        suffix.push_str(&self.config.save_ext);
        suffix
    }
}

fn resolve_boxes(config: &CropperConfig) -> PlotResult<Vec<CropBox>> {
    if config.boxes.is_empty() {
        // The corner flags form a box only when no box list was given
        // and all four corners end up non-negative.
        let top = config.top;
        let left = config.left;
        let mut bottom = config.bottom;
        let mut right = config.right;
        if config.height > 0 {
            bottom = top + config.height;
        }
        if config.width > 0 {
            right = left + config.width;
        }
        if top >= 0 && left >= 0 && bottom >= 0 && right >= 0 {
            return Ok(vec![CropBox {
                top,
                left,
                bottom,
                right,
            }]);
        }
        return Ok(Vec::new());
    }
    config
        .boxes
        .iter()
        .map(|group| {
            if group.len() != 4 {
                return Err(PlotError::config(format!(
                    "a crop box needs four values (top left bottom right), got {}",
                    group.len()
                )));
            }
            Ok(CropBox {
                top: group[0],
                left: group[1],
                bottom: group[2],
                right: group[3],
            })
        })
        .collect()
}

fn resolve_arrows(config: &CropperConfig) -> PlotResult<Vec<Arrow>> {
    if config.arrows.len() != config.arrow_color.len() {
        return Err(PlotError::config(format!(
            "every arrow needs a color ({} arrows, {} colors)",
            config.arrows.len(),
            config.arrow_color.len()
        )));
    }
    config
        .arrows
        .iter()
        .map(|group| {
            if group.len() != 4 {
                return Err(PlotError::config(format!(
                    "an arrow needs four values (x1 y1 x2 y2), got {}",
                    group.len()
                )));
            }
            Ok(Arrow {
                from_x: group[0],
                from_y: group[1],
                to_x: group[2],
                to_y: group[3],
            })
        })
        .collect()
}

fn image_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Glob-style name match supporting `*` (any run) and `?` (any one
// character), iterative with star backtracking.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let mut p = 0;
    let mut n = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;
    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            mark = n;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            mark += 1;
            n = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    fn single_image() -> CropperConfig {
        CropperConfig {
            in_img: String::from("photo.png"),
            ..CropperConfig::default()
        }
    }

    #[test]
    fn corner_flags_form_a_box_only_when_complete() {
        let mut config = single_image();
        config.top = 1;
        config.left = 2;
        config.bottom = 5;
        config.right = 6;
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(
            cropper.boxes,
            vec![CropBox {
                top: 1,
                left: 2,
                bottom: 5,
                right: 6
            }]
        );

        let mut config = single_image();
        config.left = 2;
        let cropper = Cropper::new(config).unwrap();
        assert!(cropper.boxes.is_empty());
    }

    #[test]
    fn height_and_width_derive_the_far_corners() {
        let mut config = single_image();
        config.top = 1;
        config.left = 2;
        config.height = 3;
        config.width = 4;
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(
            cropper.boxes,
            vec![CropBox {
                top: 1,
                left: 2,
                bottom: 4,
                right: 6
            }]
        );
    }

    #[test]
    fn the_box_list_wins_over_corner_flags() {
        let mut config = single_image();
        config.top = 1;
        config.left = 1;
        config.bottom = 2;
        config.right = 2;
        config.boxes = vec![vec![0, 0, 4, 4]];
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(
            cropper.boxes,
            vec![CropBox {
                top: 0,
                left: 0,
                bottom: 4,
                right: 4
            }]
        );
    }

    #[test]
    fn color_and_arrow_counts_are_validated() {
        let mut config = single_image();
        config.boxes = vec![vec![0, 0, 4, 4], vec![0, 0, 2, 2]];
        config.colors = vec![String::from("r")];
        assert!(Cropper::new(config).is_err());

        let mut config = single_image();
        config.arrows = vec![vec![0, 0, 5, 5]];
        assert!(Cropper::new(config).is_err());

        let mut config = single_image();
        config.arrows = vec![vec![0, 0, 5, 5]];
        config.arrow_color = vec![String::from("g")];
        assert!(Cropper::new(config).is_ok());
    }

    #[test]
    fn some_input_must_be_named() {
        assert!(Cropper::new(CropperConfig::default()).is_err());
    }

    #[test]
    fn crop_names_follow_rename_and_suffix_rules() {
        let mut config = single_image();
        config.top = 0;
        config.left = 0;
        config.bottom = 2;
        config.right = 2;
        let cropper = Cropper::new(config).unwrap();
        let path = Path::new("shots/photo.png");
        assert_eq!(cropper.crop_name(path, 0, 0), "photo_ROI.png");

        let mut config = single_image();
        config.boxes = vec![vec![0, 0, 2, 2], vec![1, 1, 3, 3]];
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(cropper.crop_name(path, 0, 1), "photo_01_ROI.png");

        let mut config = single_image();
        config.boxes = vec![vec![0, 0, 2, 2], vec![1, 1, 3, 3]];
        config.rename = true;
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(cropper.crop_name(path, 3, 1), "03_01_ROI.png");

        let mut config = single_image();
        config.top = 0;
        config.left = 0;
        config.bottom = 2;
        config.right = 2;
        config.do_gamma = true;
        config.do_iscale = true;
        let cropper = Cropper::new(config).unwrap();
        assert_eq!(cropper.crop_name(path, 0, 0), "photo_ROI_gamma_iscale.png");
    }

    #[test]
    fn wildcards_match_stars_and_question_marks() {
        assert!(wildcard_match("*", "anything.png"));
        assert!(wildcard_match("*night*", "a_night_01.png"));
        assert!(wildcard_match("?.png", "a.png"));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(wildcard_match("a*b", "ab"));
        assert!(!wildcard_match("*.png", "x.jpg"));
        assert!(!wildcard_match("?.png", "ab.png"));
    }
}

// src/img_tools/cropper.rs
