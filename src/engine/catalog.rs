use crate::Battalions;
use crate::board::*;
use serde::Deserialize;
use serde::Serialize;

/// Index into the prompt table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(pub usize);

/// Index into the headline table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadlineId(pub usize);

/// Index into the shop table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub usize);

/// One way to answer a prompt.
#[derive(Debug, Clone, Copy)]
pub struct Answer {
    pub label: &'static str,
    pub ideology: Ideology,
    pub reward: Resources,
}

#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub text: &'static str,
    pub answers: &'static [Answer],
}

/// What a headline does to every active player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bulletin {
    Gain(Resources),
    Levy(Resources),
    Reinforce(Battalions),
}

#[derive(Debug, Clone, Copy)]
pub struct Headline {
    pub text: &'static str,
    pub bulletin: Bulletin,
}

/// What a shop card does to its buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perk {
    Battalions(Battalions),
    Resources(Resources),
    Track(Ideology),
}

#[derive(Debug, Clone, Copy)]
pub struct ShopCard {
    pub name: &'static str,
    pub cost: Resources,
    pub perk: Perk,
}

/// Card tables the engine reads by id.
///
/// The engine never inspects card text; it only needs answers, bulletins,
/// and perks. Every replica must use the same catalog for states to agree.
pub trait Catalog: Sync {
    fn prompts(&self) -> &[Prompt];
    fn headlines(&self) -> &[Headline];
    fn shop(&self) -> &[ShopCard];
    fn prompt(&self, id: PromptId) -> Option<&Prompt> {
        self.prompts().get(id.0)
    }
    fn headline(&self, id: HeadlineId) -> Option<&Headline> {
        self.headlines().get(id.0)
    }
    fn card(&self, id: CardId) -> Option<&ShopCard> {
        self.shop().get(id.0)
    }
}

/// The built-in card set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Catalog for Standard {
    fn prompts(&self) -> &[Prompt] {
        &PROMPTS
    }
    fn headlines(&self) -> &[Headline] {
        &HEADLINES
    }
    fn shop(&self) -> &[ShopCard] {
        &SHOP
    }
}

const fn answer(label: &'static str, ideology: Ideology, reward: Resources) -> Answer {
    Answer {
        label,
        ideology,
        reward,
    }
}

const PROMPTS: [Prompt; 8] = [
    Prompt {
        text: "The transit union threatens a strike.",
        answers: &[
            answer("Mediate", Ideology::Unity, Resources::new(0, 0, 0, 1)),
            answer("Hold the line", Ideology::Order, Resources::new(0, 1, 0, 0)),
        ],
    },
    Prompt {
        text: "A tech firm offers to fund the new library.",
        answers: &[
            answer("Accept", Ideology::Liberty, Resources::new(2, 0, 0, 0)),
            answer("Publicly decline", Ideology::Reform, Resources::new(0, 0, 1, 0)),
        ],
    },
    Prompt {
        text: "Protesters occupy the central square.",
        answers: &[
            answer("Join them", Ideology::Reform, Resources::new(0, 0, 1, 0)),
            answer("Clear the square", Ideology::Order, Resources::new(0, 1, 0, 0)),
            answer("Open a dialogue", Ideology::Unity, Resources::new(0, 0, 0, 1)),
        ],
    },
    Prompt {
        text: "A rival leaks your budget memo.",
        answers: &[
            answer("Own it", Ideology::Reform, Resources::new(0, 0, 1, 0)),
            answer("Blame the bureaucracy", Ideology::Liberty, Resources::new(1, 0, 0, 0)),
        ],
    },
    Prompt {
        text: "Flooding hits the harbor district.",
        answers: &[
            answer("Emergency spending", Ideology::Unity, Resources::new(0, 0, 0, 2)),
            answer("Deploy the guard", Ideology::Order, Resources::new(0, 1, 0, 0)),
        ],
    },
    Prompt {
        text: "Small businesses demand tax relief.",
        answers: &[
            answer("Cut taxes", Ideology::Liberty, Resources::new(1, 0, 0, 0)),
            answer("Targeted grants", Ideology::Unity, Resources::new(0, 0, 0, 1)),
        ],
    },
    Prompt {
        text: "A journalist asks about police funding.",
        answers: &[
            answer("Increase it", Ideology::Order, Resources::new(0, 1, 0, 0)),
            answer("Redirect it", Ideology::Reform, Resources::new(0, 0, 1, 0)),
            answer("No comment", Ideology::Liberty, Resources::new(1, 0, 0, 0)),
        ],
    },
    Prompt {
        text: "Neighbourhood councils want more say.",
        answers: &[
            answer("Devolve power", Ideology::Unity, Resources::new(0, 0, 0, 1)),
            answer("Streamline instead", Ideology::Reform, Resources::new(0, 0, 1, 0)),
        ],
    },
];

const HEADLINES: [Headline; 6] = [
    Headline {
        text: "Economic boom lifts all campaigns.",
        bulletin: Bulletin::Gain(Resources::new(1, 0, 0, 0)),
    },
    Headline {
        text: "Scandal fatigue sweeps the city.",
        bulletin: Bulletin::Levy(Resources::new(0, 0, 1, 0)),
    },
    Headline {
        text: "Volunteers flood campaign offices.",
        bulletin: Bulletin::Reinforce(1),
    },
    Headline {
        text: "Trust in institutions rebounds.",
        bulletin: Bulletin::Gain(Resources::new(0, 0, 0, 1)),
    },
    Headline {
        text: "Donor crackdown announced.",
        bulletin: Bulletin::Levy(Resources::new(1, 0, 0, 0)),
    },
    Headline {
        text: "Talk radio turns on the council.",
        bulletin: Bulletin::Gain(Resources::new(0, 1, 0, 0)),
    },
];

const SHOP: [ShopCard; 9] = [
    ShopCard {
        name: "Field Office",
        cost: Resources::new(2, 0, 0, 0),
        perk: Perk::Battalions(2),
    },
    ShopCard {
        name: "Press Pass",
        cost: Resources::new(1, 1, 0, 0),
        perk: Perk::Resources(Resources::new(0, 0, 2, 0)),
    },
    ShopCard {
        name: "Think Tank",
        cost: Resources::new(1, 0, 1, 0),
        perk: Perk::Track(Ideology::Reform),
    },
    ShopCard {
        name: "Police Union Endorsement",
        cost: Resources::new(0, 2, 0, 0),
        perk: Perk::Track(Ideology::Order),
    },
    ShopCard {
        name: "Chamber of Commerce",
        cost: Resources::new(2, 0, 0, 0),
        perk: Perk::Track(Ideology::Liberty),
    },
    ShopCard {
        name: "Community Choir",
        cost: Resources::new(0, 0, 0, 2),
        perk: Perk::Track(Ideology::Unity),
    },
    ShopCard {
        name: "Phone Bank",
        cost: Resources::new(0, 1, 0, 1),
        perk: Perk::Battalions(1),
    },
    ShopCard {
        name: "Gala Dinner",
        cost: Resources::new(0, 0, 1, 1),
        perk: Perk::Resources(Resources::new(3, 0, 0, 0)),
    },
    ShopCard {
        name: "Rally Buses",
        cost: Resources::new(1, 0, 0, 1),
        perk: Perk::Battalions(2),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn prompts_have_choices() {
        assert!(Standard.prompts().iter().all(|p| (2..=3).contains(&p.answers.len())));
    }
    #[test]
    fn lookups_are_bounded() {
        assert!(Standard.prompt(PromptId(0)).is_some());
        assert!(Standard.card(CardId(99)).is_none());
    }
}
