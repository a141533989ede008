const IMAGE_KEYWORDS: [&str; 12] = [
    "structure",
    "molecular",
    "chemical",
    "visualize",
    "diagram",
    "image",
    "2d",
    "3d",
    "molecule",
    "compound",
    "show me",
    "draw",
];

const KNOWN_COMPOUNDS: [&str; 12] = [
    "chromene",
    "benzene",
    "caffeine",
    "aspirin",
    "penicillin",
    "dopamine",
    "serotonin",
    "acetaminophen",
    "ibuprofen",
    "morphine",
    "nicotine",
    "glucose",
];

pub const UNKNOWN_COMPOUND: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageIntent {
    pub needs_image: bool,
    pub compound: String,
}

/// Decides whether a question also asks for a rendered structure.
pub fn detect_image_requirement(message: &str) -> ImageIntent {
    let lower = message.to_lowercase();
    let needs_image = IMAGE_KEYWORDS.iter().any(|keyword| lower.contains(keyword));
    let compound = KNOWN_COMPOUNDS
        .iter()
        .find(|compound| lower.contains(*compound))
        .copied()
        .unwrap_or(UNKNOWN_COMPOUND)
        .to_string();
    ImageIntent {
        needs_image,
        compound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_requests() {
        let intent = detect_image_requirement("Show caffeine structure");
        assert!(intent.needs_image);
        assert_eq!(intent.compound, "caffeine");

        let intent = detect_image_requirement("Draw the 2D form of Serotonin");
        assert!(intent.needs_image);
        assert_eq!(intent.compound, "serotonin");
    }

    #[test]
    fn compound_without_keyword_needs_no_image() {
        let intent = detect_image_requirement("What is the half-life of nicotine?");
        assert!(!intent.needs_image);
        assert_eq!(intent.compound, "nicotine");
    }

    #[test]
    fn unknown_compound() {
        let intent = detect_image_requirement("Visualize this molecule");
        assert!(intent.needs_image);
        assert_eq!(intent.compound, UNKNOWN_COMPOUND);
    }
}
