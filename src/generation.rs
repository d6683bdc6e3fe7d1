use crate::entities::Bear;
use rand::Rng;

/// Number of survivors needed to breed a new generation.
pub const PARENTS: usize = 4;

/// Breeds a new generation from the survivors of a game.
///
/// The four healthiest survivors are paired up, the strongest with the second strongest and the
/// third with the fourth, each pair producing one child. Returns `None` if fewer than four bears
/// survived.
pub fn next_generation<R: Rng + ?Sized>(survivors: &[Bear], rng: &mut R) -> Option<Vec<Bear>> {
    if survivors.len() < PARENTS {
        return None;
    }

    let mut ranked: Vec<&Bear> = survivors.iter().collect();
    ranked.sort_by_key(|bear| std::cmp::Reverse(bear.life_points()));

    let children = ranked[..PARENTS]
        .chunks(2)
        .enumerate()
        .map(|(i, parents)| parents[0].create_new_bear(format!("b{}", i + 1), parents[1], rng))
        .collect();

    Some(children)
}
