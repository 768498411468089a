//! Fixed label set of the leaf-disease classifier.
//!
//! Index order matches the output layer of the trained model: position `i` of
//! the probability vector is the probability of `LEAF_CLASSES[i]`.
//! Labels follow the PlantVillage convention `Plant___Disease`, with healthy
//! classes ending in `healthy`.

pub const NUM_LEAF_CLASSES: usize = 38;

pub const LEAF_CLASSES: [&str; NUM_LEAF_CLASSES] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)_Powdery_mildew",
    "Cherry_(including_sour)_healthy",
    "Corn_(maize)_Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)_Common_rust",
    "Corn_(maize)_Northern_Leaf_Blight",
    "Corn_(maize)_healthy",
    "Grape___Black_rot",
    "Grape__Esca(Black_Measles)",
    "Grape__Leaf_blight(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange__Haunglongbing(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,bell__Bacterial_spot",
    "Pepper,bell__healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Index of a label in the class set.
pub fn class_index(name: &str) -> Option<usize> {
    LEAF_CLASSES.iter().position(|&n| n == name)
}

/// Whether a label denotes a healthy plant.
///
/// Matches case-insensitively anywhere in the label, so free-form labels such
/// as `"HEALTHY leaf"` count too.
pub fn is_healthy_label(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}
