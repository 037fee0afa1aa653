use crate::catalog::NewGame;

/// `(title, description, category, game_url, thumbnail)`
pub static DEFAULT_GAMES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "2048",
        "Slide numbered tiles to combine them and reach 2048",
        "Puzzle",
        "https://play2048.co/",
        "https://images.unsplash.com/photo-1606092195730-5d7b9af1efc5?w=300&h=200&fit=crop",
    ),
    (
        "Snake Game",
        "Classic snake game - eat food and grow longer",
        "Arcade",
        "https://www.google.com/fbx?fbx=snake_arcade",
        "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=300&h=200&fit=crop",
    ),
    (
        "Pac-Man",
        "Classic arcade game - eat dots and avoid ghosts",
        "Arcade",
        "https://www.google.com/logos/2010/pacman10-i.html",
        "https://images.unsplash.com/photo-1550745165-9bc0b252726f?w=300&h=200&fit=crop",
    ),
    (
        "Tetris",
        "Stack falling blocks to clear lines",
        "Puzzle",
        "https://tetris.com/play-tetris",
        "https://images.unsplash.com/photo-1606144042614-b2417e99c4e3?w=300&h=200&fit=crop",
    ),
    (
        "Solitaire",
        "Classic card game",
        "Card",
        "https://www.google.com/logos/2016/solitaire/standalone.html",
        "https://images.unsplash.com/photo-1606092195730-5d7b9af1efc5?w=300&h=200&fit=crop",
    ),
    (
        "Chess",
        "Play chess against computer or friends",
        "Strategy",
        "https://www.chess.com/play/computer",
        "https://images.unsplash.com/photo-1528819622765-d6bcf132f793?w=300&h=200&fit=crop",
    ),
];

pub fn default_games() -> impl Iterator<Item = NewGame> {
    DEFAULT_GAMES
        .iter()
        .map(|(title, description, category, game_url, thumbnail)| NewGame {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            game_url: game_url.to_string(),
            thumbnail: Some(thumbnail.to_string()),
        })
}
