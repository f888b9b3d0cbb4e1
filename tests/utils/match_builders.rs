use teamfit::tft::{Match, MatchInfo, MatchMetadata, Participant, Trait, Unit};

// ============================================================================
// Match Builders
// ============================================================================

/// Builds a match record the way the upstream API reports one
pub struct MatchBuilder {
    match_id: String,
    started_at_secs: i64,
    participants: Vec<Participant>,
}

impl MatchBuilder {
    pub fn new(match_id: &str) -> Self {
        Self {
            match_id: match_id.to_string(),
            started_at_secs: 1_580_000_000,
            participants: Vec::new(),
        }
    }

    pub fn started_at(mut self, secs: i64) -> Self {
        self.started_at_secs = secs;
        self
    }

    pub fn with_player(self, puuid: &str, placement: u32) -> Self {
        self.with_participant(PlayerBuilder::new(puuid, placement).build())
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    pub fn build(self) -> Match {
        Match {
            metadata: MatchMetadata {
                data_version: "5".to_string(),
                match_id: self.match_id,
                participants: self.participants.iter().map(|p| p.puuid.clone()).collect(),
            },
            info: MatchInfo {
                // Upstream reports start time in milliseconds
                game_datetime: self.started_at_secs * 1000 + 437,
                game_length: 2100.5,
                game_version: "Version 10.2".to_string(),
                participants: self.participants,
                queue_id: 1100,
                tft_set_number: 2,
            },
        }
    }
}

/// Builds one participant with damage, eliminations and a board
pub struct PlayerBuilder {
    participant: Participant,
}

impl PlayerBuilder {
    pub fn new(puuid: &str, placement: u32) -> Self {
        Self {
            participant: Participant {
                puuid: puuid.to_string(),
                placement,
                level: 7,
                last_round: 30,
                ..Participant::default()
            },
        }
    }

    pub fn damage(mut self, damage: u32) -> Self {
        self.participant.total_damage_to_players = damage;
        self
    }

    pub fn eliminated(mut self, players: u32) -> Self {
        self.participant.players_eliminated = players;
        self
    }

    pub fn unit(mut self, name: &str, tier: u32, rarity: u32) -> Self {
        self.participant.units.push(Unit {
            character_id: format!("TFT2_{}", name),
            name: name.to_string(),
            tier,
            rarity,
            items: vec![],
        });
        self
    }

    pub fn active_trait(mut self, name: &str, num_units: u32) -> Self {
        self.participant.traits.push(Trait {
            name: name.to_string(),
            num_units,
            tier_current: 1,
            tier_total: 3,
        });
        self
    }

    pub fn build(self) -> Participant {
        self.participant
    }
}
