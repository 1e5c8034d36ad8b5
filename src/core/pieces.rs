//! Pieces module - the shape catalogue and its rotation states
//!
//! Every orientation of every shape is hand-authored mask data: rotation is a
//! cyclic walk over a mask list, never runtime matrix math. A mask is a
//! row-major 0/1 grid over the shape's bounding box, indexed exactly like the
//! board (`row * cols + col`). Masks hold raw occupancy; the shape's color is
//! applied only when a piece freezes onto the board.

use crate::core::rng::SimpleRng;
use crate::types::PieceKind;

/// One catalogue entry: bounding box, color, and the full orientation cycle
#[derive(Debug)]
pub struct PieceDefinition {
    pub kind: PieceKind,
    pub rows: usize,
    pub cols: usize,
    pub color: u32,
    pub orientations: &'static [&'static [u8]],
}

static O_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::O,
    rows: 2,
    cols: 2,
    color: 0xcccc00,
    orientations: &[&[1, 1, 1, 1]],
};

static T_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::T,
    rows: 3,
    cols: 3,
    color: 0xff00ff,
    orientations: &[
        &[0, 1, 0, 1, 1, 1, 0, 0, 0],
        &[0, 1, 0, 0, 1, 1, 0, 1, 0],
        &[0, 0, 0, 1, 1, 1, 0, 1, 0],
        &[0, 1, 0, 1, 1, 0, 0, 1, 0],
    ],
};

static I_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::I,
    rows: 4,
    cols: 4,
    color: 0x00ffff,
    orientations: &[
        &[1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0],
    ],
};

static Z_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::Z,
    rows: 3,
    cols: 3,
    color: 0xff4d4d,
    orientations: &[
        &[1, 1, 0, 0, 1, 1, 0, 0, 0],
        &[0, 0, 1, 0, 1, 1, 0, 1, 0],
    ],
};

static S_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::S,
    rows: 3,
    cols: 3,
    color: 0xffff00,
    orientations: &[
        &[0, 1, 1, 1, 1, 0, 0, 0, 0],
        &[1, 0, 0, 1, 1, 0, 0, 1, 0],
    ],
};

static L_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::L,
    rows: 3,
    cols: 3,
    color: 0xffc14d,
    orientations: &[
        &[0, 0, 1, 1, 1, 1, 0, 0, 0],
        &[0, 1, 0, 0, 1, 0, 0, 1, 1],
        &[0, 0, 0, 1, 1, 1, 1, 0, 0],
        &[1, 1, 0, 0, 1, 0, 0, 1, 0],
    ],
};

static J_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::J,
    rows: 3,
    cols: 3,
    color: 0x8080ff,
    orientations: &[
        &[1, 0, 0, 1, 1, 1, 0, 0, 0],
        &[0, 1, 1, 0, 1, 0, 0, 1, 0],
        &[0, 0, 0, 1, 1, 1, 0, 0, 1],
        &[0, 1, 0, 0, 1, 0, 1, 1, 0],
    ],
};

static DONUT_DEF: PieceDefinition = PieceDefinition {
    kind: PieceKind::Donut,
    rows: 3,
    cols: 3,
    color: 0xffffff,
    orientations: &[&[1, 1, 1, 1, 0, 1, 1, 1, 1]],
};

/// Look up the static definition for a piece kind
pub fn definition(kind: PieceKind) -> &'static PieceDefinition {
    match kind {
        PieceKind::O => &O_DEF,
        PieceKind::T => &T_DEF,
        PieceKind::I => &I_DEF,
        PieceKind::Z => &Z_DEF,
        PieceKind::S => &S_DEF,
        PieceKind::L => &L_DEF,
        PieceKind::J => &J_DEF,
        PieceKind::Donut => &DONUT_DEF,
    }
}

/// A piece instance: a catalogue kind plus the current orientation index.
///
/// `Copy` semantics give us the immutable-update style the rotation rules
/// ask for: rotating yields a fresh value, and promoting the preview to the
/// active piece can never leave the two aliased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    orientation: usize,
}

impl Piece {
    /// A fresh piece of the given kind at orientation 0
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            orientation: 0,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn orientation(&self) -> usize {
        self.orientation
    }

    pub fn orientation_count(&self) -> usize {
        definition(self.kind).orientations.len()
    }

    /// Bounding-box height
    pub fn rows(&self) -> usize {
        definition(self.kind).rows
    }

    /// Bounding-box width
    pub fn cols(&self) -> usize {
        definition(self.kind).cols
    }

    pub fn color(&self) -> u32 {
        definition(self.kind).color
    }

    /// The 0/1 occupancy mask for the current orientation
    pub fn mask(&self) -> &'static [u8] {
        definition(self.kind).orientations[self.orientation]
    }

    /// Mask cell at bounding-box coordinates
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.mask()[row * self.cols() + col]
    }

    /// The same piece advanced one orientation (cyclic).
    ///
    /// Pure state-machine transition: no bounds or collision checks here,
    /// that is the command handler's job.
    pub fn rotated(self) -> Self {
        Self {
            kind: self.kind,
            orientation: (self.orientation + 1) % self.orientation_count(),
        }
    }
}

/// Draw a uniformly random piece from the catalogue, at orientation 0
pub fn random_piece(rng: &mut SimpleRng) -> Piece {
    let index = rng.next_range(PieceKind::ALL.len() as u32) as usize;
    Piece::spawn(PieceKind::ALL[index])
}
