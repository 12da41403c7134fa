//! Prompt templates sent to the chat endpoint
//!
//! The assistant talks French with its models; the wording is kept stable so
//! answers stay short and easy to parse.

/// Prefix of the recipe prompt; the selected items follow, comma separated
pub const RECIPE_PROMPT_PREFIX: &str =
    "Je veux une idée de recette très courte avec les éléments suivants : ";

/// Separator between items in the recipe prompt
pub const RECIPE_ITEM_SEPARATOR: &str = ", ";

/// Prompt asking the vision model to name the food in a picture
pub const FOOD_DETECTION_PROMPT: &str =
    "Quel aliment est-ce ? Tu dois juste dire son nom en un seul mot sans rien d'autre et sans point a la fin";
