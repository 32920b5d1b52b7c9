use crate::schema::UserRole;

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (
        UserRole::User,
        &[
            ActionType::PublishRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnRelations,
        ],
    ),
    (
        UserRole::Admin,
        &[
            ActionType::PublishRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnRelations,
            ActionType::ManageAllRecipes,
            ActionType::ManageUsers,
        ],
    ),
];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    PublishRecipes,

    ManageOwnRecipes,
    ManageOwnRelations,

    ManageUsers,
    ManageAllRecipes,
}

impl ActionType {
    pub fn permits(self, role: &UserRole) -> bool {
        ACTION_TABLE
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, actions)| actions.contains(&self))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_cannot_manage_foreign_recipes() {
        assert!(ActionType::PublishRecipes.permits(&UserRole::User));
        assert!(!ActionType::ManageAllRecipes.permits(&UserRole::User));
    }

    #[test]
    fn admins_can_do_everything() {
        assert!(ActionType::ManageAllRecipes.permits(&UserRole::Admin));
        assert!(ActionType::ManageUsers.permits(&UserRole::Admin));
    }
}
