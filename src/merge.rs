use crate::metadata::{ExifMetadata, ExifSummary, ImageMetadataSuggestion, VisionAIResult};

const IMAGE_EXTENSION: &str = ".jpg";

/// Sidecar id for an image file name: the name without its `.jpg` suffix.
pub fn image_id(file_name: &str) -> &str {
    file_name.strip_suffix(IMAGE_EXTENSION).unwrap_or(file_name)
}

/// `YYYY:MM:DD HH:MM:SS` -> `YYYY-MM-DD`.
pub fn format_exif_date(date_time_original: &str) -> String {
    date_time_original
        .split(' ')
        .next()
        .unwrap_or_default()
        .replace(':', "-")
}

/// Combines what exiftool read from the file with the model's suggestions.
pub fn merge_meta_and_vision_data(
    exif: &ExifMetadata,
    vision: &VisionAIResult,
) -> ImageMetadataSuggestion {
    ImageMetadataSuggestion {
        id: image_id(&exif.file_name).to_string(),
        title: vision.title_ideas.clone(),
        image: format!("./{}", exif.file_name),
        alt: vision.description.clone(),
        location: String::new(),
        date: format_exif_date(&exif.date_time_original),
        tags: vision.tags.clone(),
        exif: ExifSummary {
            camera: exif.model.clone(),
            lens: exif.lens_model.clone(),
            aperture: exif.f_number.map(|f| f.to_string()).unwrap_or_default(),
            iso: exif.iso.map(|i| i.to_string()).unwrap_or_default(),
            focal_length: exif.focal_length.replacen(" mm", "", 1),
            shutter_speed: exif.exposure_time.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = "Close-up of vibrant pink cherry blossoms on a branch with a honeybee collecting nectar. The bee's wings are slightly blurred, capturing its motion as it works. The background is a soft, dreamy pink hue, complementing the sharp details of the blossoms and the bee.";

    fn titles() -> Vec<String> {
        [
            "Blossom and Buzz",
            "Spring's Gentle Awakening",
            "Cherry Blossom Haven",
            "Nature's Delicate Balance",
            "A Bee's Spring Feast",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn tags() -> Vec<String> {
        ["nature", "cherryblossom", "bee", "spring", "floral"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn exif_data() -> ExifMetadata {
        ExifMetadata {
            source_file: "/Users/flori/Sites/flori-dev/src/content/grid/2R9A2805.jpg".to_string(),
            file_name: "2R9A2805.jpg".to_string(),
            model: "Canon EOS R6m2".to_string(),
            lens_model: "RF70-200mm F2.8 L IS USM".to_string(),
            f_number: Some(2.8),
            iso: Some(125),
            exposure_time: "1/1000".to_string(),
            focal_length: "200.0 mm".to_string(),
            date_time_original: "2024:03:17 15:06:16".to_string(),
            image_size: None,
        }
    }

    fn vision_data() -> VisionAIResult {
        VisionAIResult {
            title_ideas: titles(),
            description: DESCRIPTION.to_string(),
            tags: tags(),
        }
    }

    #[test]
    fn merges_exif_and_vision_data() {
        let expected = ImageMetadataSuggestion {
            id: "2R9A2805".to_string(),
            title: titles(),
            image: "./2R9A2805.jpg".to_string(),
            alt: DESCRIPTION.to_string(),
            location: String::new(),
            date: "2024-03-17".to_string(),
            tags: tags(),
            exif: ExifSummary {
                camera: "Canon EOS R6m2".to_string(),
                lens: "RF70-200mm F2.8 L IS USM".to_string(),
                aperture: "2.8".to_string(),
                iso: "125".to_string(),
                focal_length: "200.0".to_string(),
                shutter_speed: "1/1000".to_string(),
            },
        };
        assert_eq!(merge_meta_and_vision_data(&exif_data(), &vision_data()), expected);
    }

    #[test]
    fn merge_is_deterministic() {
        let first = merge_meta_and_vision_data(&exif_data(), &vision_data());
        let second = merge_meta_and_vision_data(&exif_data(), &vision_data());
        assert_eq!(first, second);
    }

    #[test]
    fn id_never_keeps_jpg_suffix() {
        for name in ["a.jpg", "IMG_0001.jpg", "with.dots.in.name.jpg", ".jpg"] {
            let mut exif = exif_data();
            exif.file_name = name.to_string();
            let merged = merge_meta_and_vision_data(&exif, &VisionAIResult::default());
            assert!(!merged.id.ends_with(".jpg"), "{} kept suffix", name);
            assert_eq!(merged.image, format!("./{}", name));
        }
    }

    #[test]
    fn focal_length_drops_unit() {
        for (raw, expected) in [("200.0 mm", "200.0"), ("35.0 mm", "35.0"), ("50", "50")] {
            let mut exif = exif_data();
            exif.focal_length = raw.to_string();
            let merged = merge_meta_and_vision_data(&exif, &VisionAIResult::default());
            assert_eq!(merged.exif.focal_length, expected);
            assert!(!merged.exif.focal_length.contains(" mm"));
        }
    }

    #[test]
    fn date_uses_dashes() {
        assert_eq!(format_exif_date("2024:03:17 15:06:16"), "2024-03-17");
        assert_eq!(format_exif_date("1999:12:31 23:59:59"), "1999-12-31");
        assert_eq!(format_exif_date("2020:01:02"), "2020-01-02");
    }

    #[test]
    fn whole_apertures_print_without_fraction() {
        let mut exif = exif_data();
        exif.f_number = Some(8.0);
        exif.iso = Some(6400);
        let merged = merge_meta_and_vision_data(&exif, &VisionAIResult::default());
        assert_eq!(merged.exif.aperture, "8");
        assert_eq!(merged.exif.iso, "6400");
    }

    #[test]
    fn empty_vision_result_leaves_text_fields_blank() {
        let merged = merge_meta_and_vision_data(&exif_data(), &VisionAIResult::default());
        assert!(merged.title.is_empty());
        assert!(merged.tags.is_empty());
        assert_eq!(merged.alt, "");
        assert_eq!(merged.location, "");
        assert_eq!(merged.exif.camera, "Canon EOS R6m2");
    }
}
