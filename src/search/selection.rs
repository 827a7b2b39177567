//! Parent selection strategies.
//!
//! Selection operates on the generation's *ranked* evaluated population
//! (rank 0 = best under the active sort strategy) and compares by rank
//! rather than raw fitness — it therefore follows whatever ordering the
//! sort strategy produced, for maximization and minimization alike.

use rand::{Rng, RngCore};

use super::types::{Evaluated, Genome};

/// Strategy for choosing breeding material from the ranked survivors.
///
/// # Examples
///
/// ```
/// use evosearch::search::Selection;
///
/// // Uniform choice (no selection pressure beyond survival).
/// let sel = Selection::Random;
///
/// // Tournament of size 3 (moderate pressure).
/// let sel = Selection::Tournament(3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Uniformly random choice among the pool.
    Random,
    /// Pick `k` candidates at random, select the best-ranked.
    ///
    /// Higher `k` = stronger selection pressure; `k = 1` degenerates to
    /// random choice.
    Tournament(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Selects one index from a pool of `len` ranked candidates.
    ///
    /// # Panics
    /// Panics if `len` is zero.
    fn select_index(&self, len: usize, rng: &mut dyn RngCore) -> usize {
        assert!(len > 0, "cannot select from an empty pool");
        match *self {
            Selection::Random => rng.random_range(0..len),
            Selection::Tournament(k) => {
                let k = k.max(1);
                let mut best = rng.random_range(0..len);
                for _ in 1..k {
                    let idx = rng.random_range(0..len);
                    if idx < best {
                        best = idx;
                    }
                }
                best
            }
        }
    }

    /// Draws `groups` parent groups of `group_size` for crossover.
    ///
    /// Members within one group are drawn without replacement when the
    /// pool allows it.
    pub fn parent_groups<'a, G: Genome>(
        &self,
        ranked: &'a [Evaluated<G>],
        groups: usize,
        group_size: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Vec<&'a G>> {
        (0..groups)
            .map(|_| {
                let mut chosen: Vec<usize> = Vec::with_capacity(group_size);
                for _ in 0..group_size {
                    let mut idx = self.select_index(ranked.len(), rng);
                    if ranked.len() > group_size {
                        let mut attempts = 0;
                        while chosen.contains(&idx) && attempts < 16 {
                            idx = self.select_index(ranked.len(), rng);
                            attempts += 1;
                        }
                    }
                    chosen.push(idx);
                }
                chosen.into_iter().map(|i| &ranked[i].genome).collect()
            })
            .collect()
    }

    /// Draws `count` genomes for mutation.
    pub fn pick<'a, G: Genome>(
        &self,
        ranked: &'a [Evaluated<G>],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<&'a G> {
        (0..count)
            .map(|_| &ranked[self.select_index(ranked.len(), rng)].genome)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::GenomeId;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[derive(Debug, Clone)]
    struct Plain {
        id: GenomeId,
    }

    impl Genome for Plain {
        fn id(&self) -> GenomeId {
            self.id
        }
    }

    fn ranked(n: usize) -> Vec<Evaluated<Plain>> {
        // Rank order: id 0 is best.
        (0..n)
            .map(|i| Evaluated {
                genome: Plain { id: i as GenomeId },
                fitness: -(i as f64),
                phenotype: vec![],
            })
            .collect()
    }

    #[test]
    fn test_tournament_favors_top_ranks() {
        let pool = ranked(10);
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let sel = Selection::Tournament(3);

        let mut top_half = 0;
        let n = 10_000;
        for _ in 0..n {
            let picked = sel.pick(&pool, 1, &mut rng)[0];
            if picked.id() < 5 {
                top_half += 1;
            }
        }
        // With k=3 the top half wins 1 - (1/2)^3 = 87.5% of draws.
        assert!(
            top_half > 8_000,
            "expected top-half dominance, got {top_half}/{n}"
        );
    }

    #[test]
    fn test_random_is_roughly_uniform() {
        let pool = ranked(4);
        let mut rng = Pcg64Mcg::seed_from_u64(42);

        let mut counts = [0u32; 4];
        let n = 10_000;
        for _ in 0..n {
            counts[Selection::Random.pick(&pool, 1, &mut rng)[0].id() as usize] += 1;
        }
        for &c in &counts {
            assert!(c > 2_000, "expected uniform draws, got {counts:?}");
        }
    }

    #[test]
    fn test_parent_groups_shape() {
        let pool = ranked(10);
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let groups = Selection::Tournament(2).parent_groups(&pool, 5, 2, &mut rng);
        assert_eq!(groups.len(), 5);
        for group in &groups {
            assert_eq!(group.len(), 2);
            // Distinct parents when the pool is large enough.
            assert_ne!(group[0].id(), group[1].id());
        }
    }

    #[test]
    fn test_parent_groups_tiny_pool_allows_repeats() {
        let pool = ranked(1);
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let groups = Selection::Random.parent_groups(&pool, 2, 2, &mut rng);
        for group in &groups {
            assert_eq!(group.len(), 2);
        }
    }

    #[test]
    fn test_tournament_size_one_is_random() {
        let pool = ranked(4);
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[Selection::Tournament(1).pick(&pool, 1, &mut rng)[0].id() as usize] += 1;
        }
        for &c in &counts {
            assert!(c > 2_000, "expected uniform draws, got {counts:?}");
        }
    }

    #[test]
    #[should_panic(expected = "cannot select from an empty pool")]
    fn test_empty_pool_panics() {
        let pool: Vec<Evaluated<Plain>> = vec![];
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        Selection::Random.pick(&pool, 1, &mut rng);
    }
}
