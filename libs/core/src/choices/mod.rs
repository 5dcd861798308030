//! Rendering and recognizing lists of choices.

pub mod channel;
mod choice;
mod factory;
mod find;
mod recognizers;
mod tokenizer;

pub use choice::{Choice, FoundChoice, FoundValue, ModelResult, SortedValue};
pub use factory::{ChoiceFactory, ChoiceFactoryOptions, ListStyle};
pub use find::{
    FindChoicesOptions, FindValuesOptions, find_choices, find_choices_from_strings, find_values,
};
pub use recognizers::{recognize_choices, recognize_choices_from_strings};
pub use tokenizer::{Token, tokenize};
