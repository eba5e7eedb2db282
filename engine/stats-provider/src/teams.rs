//! Static NHL team tables

/// (abbreviation, upstream team id, full name)
const TEAMS: &[(&str, u32, &str)] = &[
    ("ANA", 24, "Anaheim Ducks"),
    ("BOS", 6, "Boston Bruins"),
    ("BUF", 7, "Buffalo Sabres"),
    ("CAR", 12, "Carolina Hurricanes"),
    ("CBJ", 29, "Columbus Blue Jackets"),
    ("CGY", 20, "Calgary Flames"),
    ("CHI", 16, "Chicago Blackhawks"),
    ("COL", 21, "Colorado Avalanche"),
    ("DAL", 25, "Dallas Stars"),
    ("DET", 17, "Detroit Red Wings"),
    ("EDM", 22, "Edmonton Oilers"),
    ("FLA", 13, "Florida Panthers"),
    ("LAK", 26, "Los Angeles Kings"),
    ("MIN", 30, "Minnesota Wild"),
    ("MTL", 8, "Montreal Canadiens"),
    ("NJD", 1, "New Jersey Devils"),
    ("NSH", 18, "Nashville Predators"),
    ("NYI", 2, "New York Islanders"),
    ("NYR", 3, "New York Rangers"),
    ("OTT", 9, "Ottawa Senators"),
    ("PHI", 4, "Philadelphia Flyers"),
    ("PIT", 5, "Pittsburgh Penguins"),
    ("SEA", 55, "Seattle Kraken"),
    ("SJS", 28, "San Jose Sharks"),
    ("STL", 19, "St. Louis Blues"),
    ("TBL", 14, "Tampa Bay Lightning"),
    ("TOR", 10, "Toronto Maple Leafs"),
    ("UTA", 53, "Utah Hockey Club"),
    ("VAN", 23, "Vancouver Canucks"),
    ("VGK", 54, "Vegas Golden Knights"),
    ("WPG", 52, "Winnipeg Jets"),
    ("WSH", 15, "Washington Capitals"),
];

/// Upstream team id for an abbreviation
pub fn team_id(abbrev: &str) -> Option<u32> {
    TEAMS.iter().find(|(code, _, _)| *code == abbrev).map(|(_, id, _)| *id)
}

/// Full team name, or the abbreviation itself when unknown
pub fn full_name(abbrev: &str) -> String {
    TEAMS
        .iter()
        .find(|(code, _, _)| *code == abbrev)
        .map(|(_, _, name)| name.to_string())
        .unwrap_or_else(|| abbrev.to_string())
}

pub fn headshot_url(season_id: &str, player_id: i64, team_abbrev: &str) -> String {
    if team_abbrev.is_empty() {
        return format!(
            "https://nhl.bamcontent.com/images/headshots/current/168x168/{}.png",
            player_id
        );
    }

    format!("https://assets.nhle.com/mugs/nhl/{}/{}/{}.png", season_id, team_abbrev, player_id)
}
