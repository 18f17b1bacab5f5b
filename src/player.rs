//! Player color slots
//!
//! SLP files order the player color ramps differently from the in-game
//! player list: orange is slot 5 inside the sprite format but player 7 in
//! the game UI. [`slot_for_player`] translates the in-game number into the
//! slot the decoder recolors with.

/// In-game player used when none is selected.
pub const DEFAULT_PLAYER: u8 = 1;

/// Highest in-game player number.
pub const MAX_PLAYER: u8 = 8;

/// In-game player -> SLP slot, for the players whose numbers differ.
const PLAYER_SLOT_SWAPS: &[(u8, u8)] = &[
    (5, 6), // cyan
    (6, 7), // magenta
    (7, 5), // orange
];

/// Return the SLP player color slot for an in-game player number.
///
/// Players 5, 6 and 7 are swapped into slots 6, 7 and 5. Every other value,
/// including numbers outside `1..=8`, is returned unchanged so the renderer
/// can decide whether the resulting palette index exists.
///
/// # Examples
///
/// ```
/// use slp_render::player::slot_for_player;
///
/// assert_eq!(slot_for_player(7), 5);
/// assert_eq!(slot_for_player(2), 2);
/// ```
pub fn slot_for_player(player: u8) -> u8 {
    PLAYER_SLOT_SWAPS
        .iter()
        .find(|(in_game, _)| *in_game == player)
        .map(|(_, slot)| *slot)
        .unwrap_or(player)
}

/// Check whether a number is a valid in-game player.
pub fn is_valid_player(player: u8) -> bool {
    player >= 1 && player <= MAX_PLAYER
}
