//! Centralized defaults for neuroga evolution parameters.
//!
//! All configurable parameters are defined here with the `NEUROGA_` prefix, and are what
//! [crate::config::Config] falls back to when a field is omitted.

// ============================================================================
// Population Parameters
// ============================================================================

/// Individuals per generation
pub const NEUROGA_POPULATION: usize = 50;

/// Fittest individuals retained as breeding stock. Never fewer than 2
pub const NEUROGA_N_BESTS: usize = 4;

/// Fittest individuals copied unchanged into the next generation
pub const NEUROGA_KEEP_BESTS: usize = 0;

// ============================================================================
// Gene Parameters
// ============================================================================

/// Lower bound of a freshly drawn gene
pub const NEUROGA_GENE_MIN: f64 = -1.0;

/// Upper bound of a freshly drawn gene
pub const NEUROGA_GENE_MAX: f64 = 1.0;

// ============================================================================
// Mutation Parameters
// ============================================================================

/// Per-chromosome mutation chance at the first generation
pub const NEUROGA_MUTATION_START: f64 = 0.25;

/// Per-chromosome mutation chance once the schedule has run out
pub const NEUROGA_MUTATION_STOP: f64 = 0.05;

/// Generations over which the mutation chance is interpolated
pub const NEUROGA_MUTATION_GENERATIONS: usize = 100;

// ============================================================================
// History Parameters
// ============================================================================

/// Generations kept in history by the default retention policy
pub const NEUROGA_HISTORY_DEFAULT: usize = 16;
