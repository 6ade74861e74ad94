//! Instructional slides shown before the game starts

use serde::{Deserialize, Serialize};

/// One onboarding screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub text: String,
    pub button: String,
}

impl Slide {
    pub fn new(text: impl Into<String>, button: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            button: button.into(),
        }
    }
}

/// Result of pressing a slide's button
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnboardingStep<'a> {
    /// Show this slide next
    Next(&'a Slide),
    /// Carousel done; start the game
    StartGame,
}

/// Linear slide carousel
#[derive(Debug, Clone)]
pub struct Onboarding {
    slides: Vec<Slide>,
    index: usize,
    finished: bool,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new(default_slides())
    }
}

impl Onboarding {
    pub fn new(slides: Vec<Slide>) -> Self {
        let finished = slides.is_empty();
        Self {
            slides,
            index: 0,
            finished,
        }
    }

    /// Slide on screen, `None` once finished
    pub fn current(&self) -> Option<&Slide> {
        if self.finished {
            return None;
        }
        self.slides.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Press the current slide's button
    pub fn advance(&mut self) -> OnboardingStep<'_> {
        if self.finished || self.index + 1 >= self.slides.len() {
            self.finished = true;
            return OnboardingStep::StartGame;
        }
        self.index += 1;
        OnboardingStep::Next(&self.slides[self.index])
    }
}

/// Built-in copy
pub fn default_slides() -> Vec<Slide> {
    vec![
        Slide::new("Hi! Welcome aboard. I love building things with machine learning.", "Next"),
        Slide::new(
            "In this playground you'll see how machine learning\ncan make the world a little better.",
            "Next",
        ),
        Slide::new(
            "For many people with motor disabilities, moving around or expressing themselves\n\
             can be very challenging. Computer vision can help: facial gestures\n\
             become a way to move and to communicate.",
            "Next",
        ),
        Slide::new(
            "Your goal is to catch as many space apples as you can.\n\
             To move, just tilt your head a little.\n\
             I'll watch your eyes to know where you want to go.",
            "Next",
        ),
        Slide::new("Let's check it out!", "Start game!"),
    ]
}
