//! The 28 × 18 reference warehouse.
//!
//! ```text
//! y0   ############################
//! y1   #++++++++++++++++++++++++++#  top pickup lane (no Up)
//! y2   #=PPPPPPPPPPPPPPPPPPPPPPPP=#  pallets, exit Up
//! y3   #=PPPPPPPPPPPPPPPPPPPPPPPP=#  pallets, exit Down
//! y4   #+===========++===========+#  two-lane aisle
//! y5   #+===========++===========+#
//! y6   #=PPPPPPPPPPP==PPPPPPPPPPP=#
//! ...
//! y16  #++++++++++++SS++++++++++++#  bottom pickup lane, sheds in the middle
//! y17  ############################
//! ```
//!
//! Pallets are dead ends: one move back to the lane they were entered from.
//! Each pallet row pair is split into a left and a right sector at the
//! centre aisle, so a row pair can serve two vehicles at once.
//!
//! The two outer columns and the centre aisle are single lanes that
//! vehicles can meet head-on in.  Each is a sector of its own, so a vehicle
//! may only turn onto one while nobody else is on it.  The centre aisle's
//! two columns share one sector; crossing between them needs no lock.

use wh_core::{Move, MoveSet, Position, SectorId};
use wh_grid::{GridGraph, GridResult, SectorPartition};

pub const WIDTH:  i32 = 28;
pub const HEIGHT: i32 = 18;

/// Left and right column of the centre aisle.
const MID_L: i32 = WIDTH / 2 - 1;
const MID_R: i32 = WIDTH / 2;

/// The floor plan, its sectors, the pallets tasks are drawn from and the
/// two sheds.
pub struct Layout {
    pub graph:   GridGraph,
    pub sectors: SectorPartition,
    pub pallets: Vec<Position>,
    pub sheds:   Vec<Position>,
}

/// Vehicles start spread along the bottom lane.
pub fn spawn_points() -> [Position; 4] {
    let y = HEIGHT - 2;
    [Position::new(2, y), Position::new(WIDTH - 3, y), Position::new(8, y), Position::new(19, y)]
}

pub fn build_layout() -> GridResult<Layout> {
    use Move::{Down, Left, Right, Up};

    // Later writes replace earlier ones, so the order below matters.
    let mut cells: Vec<(Position, MoveSet)> = Vec::new();
    let mut put = |x: i32, y: i32, moves: &[Move]| cells.push((Position::new(x, y), MoveSet::of(moves)));

    // Outer columns.
    for x in [1, WIDTH - 2] {
        for y in 1..HEIGHT - 1 {
            put(x, y, &[Up, Down]);
        }
    }
    put(1, 1, &[Right, Down]);
    put(WIDTH - 2, 1, &[Left, Down]);
    put(1, HEIGHT - 2, &[Right, Up]);
    put(WIDTH - 2, HEIGHT - 2, &[Left, Up]);

    // Two-lane cross aisles.
    for y in aisle_rows() {
        for x in 2..WIDTH - 2 {
            put(x, y, &[Left, Right, Up, Down]);
            put(x, y + 1, &[Left, Right, Up, Down]);
        }
    }

    // Pickup lanes along the top and bottom walls.
    for x in 2..WIDTH - 2 {
        put(x, 1, &[Left, Right, Down]);
        put(x, HEIGHT - 2, &[Left, Right, Up]);
    }

    // Side junctions where the aisles meet the outer columns.
    for y in aisle_rows() {
        for yy in [y, y + 1] {
            put(1, yy, &[Up, Down, Right]);
            put(WIDTH - 2, yy, &[Up, Down, Left]);
        }
    }

    // Pallet rows: the upper row exits Up, the lower row exits Down.
    let mut pallets = Vec::new();
    for y in pallet_rows() {
        for x in 2..WIDTH - 2 {
            put(x, y, &[Up]);
            put(x, y + 1, &[Down]);
            pallets.push(Position::new(x, y));
            pallets.push(Position::new(x, y + 1));
        }
    }

    // Centre aisle cuts through every pallet block below the first.
    for y in 4..HEIGHT - 2 {
        put(MID_L, y, &[Up, Down, Right]);
        put(MID_R, y, &[Up, Down, Left]);
    }
    for y in aisle_rows() {
        for yy in [y, y + 1] {
            put(MID_L, yy, &[Up, Down, Left, Right]);
            put(MID_R, yy, &[Up, Down, Left, Right]);
        }
    }
    put(MID_L, 4, &[Down, Left, Right]);
    put(MID_R, 4, &[Down, Left, Right]);

    let sheds = vec![Position::new(MID_L, HEIGHT - 2), Position::new(MID_R, HEIGHT - 2)];
    for &shed in &sheds {
        put(shed.x, shed.y, &[Left, Right, Up]);
    }

    let graph = GridGraph::from_moves(cells);

    // Pallets the centre aisle overwrote are lanes now, and the two under
    // the aisle's first junction cannot be entered at all.
    let pallets: Vec<Position> = pallets
        .into_iter()
        .filter(|p| !(p.y >= 4 && (p.x == MID_L || p.x == MID_R)))
        .filter(|&p| Move::ALL.iter().any(|&mv| graph.is_legal_step(p.step(mv), p)))
        .collect();

    let sectors = SectorPartition::new(
        &graph,
        pallets.iter().map(|&p| (p, sector_of(p))).chain(lane_cells()),
    )?;

    Ok(Layout { graph, sectors, pallets, sheds })
}

/// Cells of the three single lanes, each with its lane sector.
fn lane_cells() -> impl Iterator<Item = (Position, SectorId)> {
    let first = pallet_rows().count() as u32 * 2;
    let (left, right, centre) = (SectorId(first), SectorId(first + 1), SectorId(first + 2));
    let sides = (1..HEIGHT - 1).flat_map(move |y| {
        [(Position::new(1, y), left), (Position::new(WIDTH - 2, y), right)]
    });
    let middle = (4..HEIGHT - 2).flat_map(move |y| {
        [(Position::new(MID_L, y), centre), (Position::new(MID_R, y), centre)]
    });
    sides.chain(middle)
}

/// Upper row of each two-lane aisle.
fn aisle_rows() -> impl Iterator<Item = i32> {
    (4..HEIGHT - 4).step_by(4)
}

/// Upper row of each pallet row pair.
fn pallet_rows() -> impl Iterator<Item = i32> {
    (2..HEIGHT - 2).step_by(4)
}

fn sector_of(p: Position) -> SectorId {
    let pair = ((p.y - 2) / 4) as u32;
    let side = u32::from(p.x >= MID_R);
    SectorId(pair * 2 + side)
}
