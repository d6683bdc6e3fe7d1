use crate::entities::{Bear, EatOutcome, Entity, Food};
use crate::error::{BearHuntError, Result};
use crate::location::Location;
use crossterm::{
    cursor::Hide,
    execute,
    style::{Color, Print, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::io::{stdout, Write};

/// Character drawn for a cell nobody occupies.
pub const EMPTY_CHAR: char = '0';

// Bounds the search for an empty cell; scaled by the number of cells on the board
const PLACEMENT_ATTEMPTS_PER_CELL: usize = 64;

/// Whatever is standing on a cell, referenced by its index in the board's lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Occupant {
    Bear(usize),
    Food(usize),
}

/// A square board whose edges wrap around.
///
/// Entities know their own location, so the board keeps plain lists rather than a grid. Bears are
/// kept in the order they were placed, which is also the order they take their turns in.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    bears: Vec<Bear>,
    foods: Vec<Food>,
}

/// Checks that a board of this size can exist.
///
/// The size has to be positive, fit the `i32` coordinates of a [`Location`], and its number of
/// cells has to fit in a `usize`.
pub fn validate_board_size(size: usize) -> Result<()> {
    let fits_coordinates = i32::try_from(size).is_ok();
    let fits_cells = size.checked_mul(size).is_some();

    if size == 0 || !fits_coordinates || !fits_cells {
        return Err(BearHuntError::InvalidBoardSize { size });
    }
    Ok(())
}

impl Board {
    pub fn new(size: usize) -> Result<Board> {
        validate_board_size(size)?;

        Ok(Board {
            size,
            bears: Vec::new(),
            foods: Vec::new(),
        })
    }

    /// Parses a board layout.
    ///
    /// A layout has a `size N` header followed by one `m` line per row using the same characters
    /// the board is rendered with: `B` for a bear, `H` for honey and `0` (or `.`) for an empty
    /// cell. Bears found in the layout get random traits and are named after their position.
    pub fn parse<R: Rng + ?Sized>(contents: &str, rng: &mut R) -> Result<Board> {
        let size: usize = Regex::new(r"size (\d+)")
            .map_err(|e| BearHuntError::MalformedLayout(e.to_string()))?
            .captures(contents)
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| BearHuntError::MalformedLayout("missing size header".to_string()))?
            .as_str()
            .parse()
            .map_err(|_| BearHuntError::MalformedLayout("size is too large".to_string()))?;

        let mut board = Board::new(size)?;

        let rows: Vec<&str> = Regex::new(r"m (.*)")
            .map_err(|e| BearHuntError::MalformedLayout(e.to_string()))?
            .captures_iter(contents)
            .filter_map(|captures| captures.get(1))
            .map(|row| row.as_str().trim())
            .collect();

        if rows.len() != size {
            return Err(BearHuntError::MalformedLayout(format!(
                "expected {} rows, found {}",
                size,
                rows.len()
            )));
        }

        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return Err(BearHuntError::MalformedLayout(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    cells.len(),
                    size
                )));
            }

            for (col, value) in cells.into_iter().enumerate() {
                let location = Location::new(row as i32, col as i32);
                match value {
                    '0' | '.' => {}
                    'B' => {
                        let mut bear = Bear::random(format!("{}-{}", row, col), rng);
                        bear.set_location(location);
                        board.bears.push(bear);
                    }
                    'H' => board.foods.push(Food::honey(location)),
                    _ => {
                        return Err(BearHuntError::MalformedLayout(format!(
                            "invalid character '{}' at ({}, {})",
                            value, row, col
                        )))
                    }
                }
            }
        }

        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> usize {
        // Cannot overflow, the size was validated when the board was built
        self.size * self.size
    }

    /// Whether every cell holds a bear or food.
    ///
    /// A bear that turned down the honey it walked onto shares its cell, so cells are counted
    /// rather than entities.
    pub fn is_full(&self) -> bool {
        let taken: HashSet<Location> = self
            .bears
            .iter()
            .map(|bear| bear.location())
            .chain(self.foods.iter().map(|food| food.location()))
            .collect();

        taken.len() >= self.cells()
    }

    pub fn bears(&self) -> &[Bear] {
        &self.bears
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn bear_mut(&mut self, index: usize) -> Option<&mut Bear> {
        self.bears.get_mut(index)
    }

    /// Mutable access to two different bears at once.
    pub fn bear_pair_mut(&mut self, first: usize, second: usize) -> (&mut Bear, &mut Bear) {
        assert_ne!(first, second, "a bear cannot be paired with itself");

        if first < second {
            let (left, right) = self.bears.split_at_mut(second);
            (&mut left[first], &mut right[0])
        } else {
            let (left, right) = self.bears.split_at_mut(first);
            (&mut right[0], &mut left[second])
        }
    }

    pub fn bear_index(&self, id: &str) -> Option<usize> {
        self.bears.iter().position(|bear| bear.id() == id)
    }

    pub fn place_bear(&mut self, mut bear: Bear, location: Location) {
        bear.set_location(location);
        self.bears.push(bear);
    }

    pub fn place_food(&mut self, food: Food) {
        self.foods.push(food);
    }

    pub fn remove_bear(&mut self, index: usize) -> Bear {
        self.bears.remove(index)
    }

    pub fn remove_food(&mut self, index: usize) -> Food {
        self.foods.remove(index)
    }

    pub fn relocate_bear(&mut self, index: usize, location: Location) {
        self.bears[index].set_location(location);
    }

    /// Offers a piece of food to a bear. The food stays on the board either way.
    pub fn offer_food<R: Rng + ?Sized>(
        &mut self,
        bear: usize,
        food: usize,
        rng: &mut R,
    ) -> EatOutcome {
        self.foods[food].be_eaten_by(&mut self.bears[bear], rng)
    }

    /// Finds what stands on the given location, ignoring the bear at `except`.
    ///
    /// Bears are looked up before food, so a bear is found even if it shares its cell.
    pub fn occupant(&self, location: Location, except: Option<usize>) -> Option<Occupant> {
        let bear = self
            .bears
            .iter()
            .enumerate()
            .find(|(index, bear)| Some(*index) != except && bear.location() == location)
            .map(|(index, _)| Occupant::Bear(index));

        bear.or_else(|| {
            self.foods
                .iter()
                .position(|food| food.location() == location)
                .map(Occupant::Food)
        })
    }

    pub fn is_empty_cell(&self, location: Location) -> bool {
        self.occupant(location, None).is_none()
    }

    /// Picks a random empty cell by sampling the whole board until one is free.
    ///
    /// Sampling gives up after a number of attempts proportional to the number of cells, which
    /// only happens when the board is full or very nearly so.
    pub fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Location> {
        let attempts = self.cells().saturating_mul(PLACEMENT_ATTEMPTS_PER_CELL);

        for _ in 0..attempts {
            let location = Location::new(
                rng.gen_range(0..self.size) as i32,
                rng.gen_range(0..self.size) as i32,
            );
            if self.is_empty_cell(location) {
                return Ok(location);
            }
        }

        Err(BearHuntError::PlacementExhausted { attempts })
    }

    /// The character for every cell, row by row.
    pub fn chars(&self) -> Vec<Vec<char>> {
        let mut grid = vec![vec![EMPTY_CHAR; self.size]; self.size];

        // Food goes first so a bear standing on it is the one that shows
        let entities = self
            .foods
            .iter()
            .map(|food| food as &dyn Entity)
            .chain(self.bears.iter().map(|bear| bear as &dyn Entity));

        for entity in entities {
            let location = entity.location();
            grid[location.row as usize][location.col as usize] = entity.char();
        }

        grid
    }

    /// Renders the board as text: one line per row followed by a divider.
    pub fn render(&self) -> String {
        let mut output = String::new();

        for row in self.chars() {
            for value in row {
                output.push(value);
                output.push_str("  ");
            }
            output.push('\n');
        }
        output.push_str(&"___".repeat(self.size));
        output.push('\n');

        output
    }

    /// Draws the board to the console in colour.
    pub fn draw(&self, round: usize) -> Result<()> {
        let mut stdout = stdout();

        // Display information about the game
        execute!(
            stdout,
            Clear(ClearType::All),
            Hide,
            Print("Round: "),
            Print(round.to_string()),
            Print("\nBears: "),
            Print(self.bears.len().to_string()),
            Print("\nHoney: "),
            Print(self.foods.len().to_string()),
            Print("\n\n")
        )?;

        let mut colors = vec![vec![Color::Reset; self.size]; self.size];
        for food in &self.foods {
            let location = food.location();
            colors[location.row as usize][location.col as usize] = food.color();
        }
        for bear in &self.bears {
            let location = bear.location();
            colors[location.row as usize][location.col as usize] = bear.color();
        }

        // Display the board
        for (row, chars) in self.chars().into_iter().enumerate() {
            for (col, value) in chars.into_iter().enumerate() {
                execute!(
                    stdout,
                    SetForegroundColor(colors[row][col]),
                    Print(value),
                    Print("  "),
                    SetForegroundColor(Color::Reset)
                )?;
            }
            execute!(stdout, Print("\n"))?;
        }

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Traits;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bear() -> Bear {
        Bear::new("test", Traits::new(0.5, 0.5, 0.5, 0.5).unwrap())
    }

    #[test]
    fn when_creating_a_board_of_size_zero_an_error_is_returned() {
        assert!(matches!(
            Board::new(0),
            Err(BearHuntError::InvalidBoardSize { size: 0 })
        ));
    }

    #[test]
    fn when_creating_a_board_too_large_for_its_coordinates_an_error_is_returned() {
        let size = i32::MAX as usize + 1;

        assert!(matches!(
            Board::new(size),
            Err(BearHuntError::InvalidBoardSize { size: s }) if s == size
        ));
    }

    #[test]
    fn when_every_cell_is_taken_the_board_is_full() {
        let mut board = Board::new(2).unwrap();
        board.place_bear(bear(), Location::new(0, 0));
        board.place_food(Food::honey(Location::new(0, 1)));
        board.place_food(Food::honey(Location::new(1, 0)));
        board.place_food(Food::honey(Location::new(0, 0)));
        assert!(!board.is_full());

        board.place_food(Food::honey(Location::new(1, 1)));

        assert!(board.is_full());
    }

    #[test]
    fn when_parsing_a_layout_the_board_is_created_with_the_correct_size_and_entities() {
        let mut rng = StdRng::seed_from_u64(0);
        let layout = "\
            size 3
            m B0H
            m .0.
            m H0B";
        let board = Board::parse(layout, &mut rng).unwrap();

        assert_eq!(board.size(), 3);
        assert_eq!(board.cells(), 9);
        assert_eq!(board.bears().len(), 2);
        assert_eq!(board.foods().len(), 2);
        assert_eq!(board.bears()[0].location(), Location::new(0, 0));
        assert_eq!(board.bears()[1].location(), Location::new(2, 2));
        assert_eq!(board.foods()[0].location(), Location::new(0, 2));
        assert_eq!(board.foods()[1].location(), Location::new(2, 0));
    }

    #[test]
    fn when_parsing_a_rendered_board_the_cell_separators_are_ignored() {
        let mut rng = StdRng::seed_from_u64(0);
        let layout = "\
            size 2
            m B  0
            m 0  H";
        let board = Board::parse(layout, &mut rng).unwrap();

        assert_eq!(board.bears().len(), 1);
        assert_eq!(board.foods().len(), 1);
        assert_eq!(board.foods()[0].location(), Location::new(1, 1));
    }

    #[test]
    fn when_parsing_a_layout_without_a_size_an_error_is_returned() {
        let mut rng = StdRng::seed_from_u64(0);

        let result = Board::parse("m B0", &mut rng);

        assert!(matches!(result, Err(BearHuntError::MalformedLayout(_))));
    }

    #[test]
    fn when_parsing_a_layout_with_missing_rows_or_cells_an_error_is_returned() {
        let mut rng = StdRng::seed_from_u64(0);

        let missing_row = "\
            size 2
            m B0";
        let short_row = "\
            size 2
            m B0
            m 0";

        assert!(matches!(
            Board::parse(missing_row, &mut rng),
            Err(BearHuntError::MalformedLayout(_))
        ));
        assert!(matches!(
            Board::parse(short_row, &mut rng),
            Err(BearHuntError::MalformedLayout(_))
        ));
    }

    #[test]
    fn when_parsing_a_layout_with_an_invalid_character_an_error_is_returned() {
        let mut rng = StdRng::seed_from_u64(0);
        let layout = "\
            size 2
            m B%
            m 00";

        assert!(matches!(
            Board::parse(layout, &mut rng),
            Err(BearHuntError::MalformedLayout(_))
        ));
    }

    #[test]
    fn when_looking_up_an_occupant_bears_are_found_before_food() {
        let mut board = Board::new(3).unwrap();
        board.place_food(Food::honey(Location::new(1, 1)));
        board.place_bear(bear(), Location::new(0, 0));
        board.place_bear(bear(), Location::new(1, 1));

        assert_eq!(
            board.occupant(Location::new(1, 1), None),
            Some(Occupant::Bear(1))
        );
        assert_eq!(
            board.occupant(Location::new(1, 1), Some(1)),
            Some(Occupant::Food(0))
        );
        assert_eq!(board.occupant(Location::new(0, 0), Some(0)), None);
        assert_eq!(board.occupant(Location::new(2, 2), None), None);
        assert!(!board.is_empty_cell(Location::new(0, 0)));
        assert!(board.is_empty_cell(Location::new(2, 2)));
    }

    #[test]
    fn when_picking_a_random_empty_cell_the_only_free_cell_is_returned() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut board = Board::new(2).unwrap();
        board.place_bear(bear(), Location::new(0, 0));
        board.place_bear(bear(), Location::new(0, 1));
        board.place_food(Food::honey(Location::new(1, 0)));

        for _ in 0..20 {
            assert_eq!(
                board.random_empty_cell(&mut rng).unwrap(),
                Location::new(1, 1)
            );
        }
    }

    #[test]
    fn when_picking_a_random_empty_cell_on_a_full_board_an_error_is_returned() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut board = Board::new(1).unwrap();
        board.place_bear(bear(), Location::new(0, 0));

        let result = board.random_empty_cell(&mut rng);

        assert!(matches!(
            result,
            Err(BearHuntError::PlacementExhausted { attempts: 64 })
        ));
    }

    #[test]
    fn when_pairing_bears_both_orders_return_the_requested_bears() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut board = Board::new(3).unwrap();
        board.place_bear(Bear::random("first", &mut rng), Location::new(0, 0));
        board.place_bear(Bear::random("second", &mut rng), Location::new(0, 1));

        let (a, b) = board.bear_pair_mut(0, 1);
        assert_eq!((a.name(), b.name()), ("first", "second"));

        let (a, b) = board.bear_pair_mut(1, 0);
        assert_eq!((a.name(), b.name()), ("second", "first"));
    }

    #[test]
    fn when_removing_entities_they_are_no_longer_on_the_board() {
        let mut board = Board::new(3).unwrap();
        board.place_bear(bear(), Location::new(0, 0));
        board.place_food(Food::honey(Location::new(1, 1)));
        let id = board.bears()[0].id().to_string();

        assert_eq!(board.bear_index(&id), Some(0));

        board.remove_bear(0);
        board.remove_food(0);

        assert_eq!(board.bear_index(&id), None);
        assert!(board.is_empty_cell(Location::new(0, 0)));
        assert!(board.is_empty_cell(Location::new(1, 1)));
    }

    #[test]
    fn when_rendering_a_board_each_row_and_the_divider_are_printed() {
        let mut board = Board::new(2).unwrap();
        board.place_bear(bear(), Location::new(0, 1));
        board.place_food(Food::honey(Location::new(1, 0)));

        assert_eq!(board.render(), "0  B  \nH  0  \n______\n");
    }

    #[test]
    fn when_rendering_a_board_twice_the_output_is_identical() {
        let mut rng = StdRng::seed_from_u64(0);
        let layout = "\
            size 3
            m B0H
            m 0H0
            m H0B";
        let board = Board::parse(layout, &mut rng).unwrap();

        assert_eq!(board.render(), board.render());
    }
}
