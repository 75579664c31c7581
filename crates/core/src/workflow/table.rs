use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use crate::domain::Role;
use crate::workflow::states::{Action, EntityType, Status};

/// How a transition reaches the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// `PUT /{resource}/{id}/{action}` with an empty body.
    ActionRoute,
    /// `PUT /{resource}/{id}` with `{ "<status_field>": "<next status>" }`.
    StatusField,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    pub entity: EntityType,
    pub from: Status,
    pub action: Action,
    pub to: Status,
    pub roles: &'static [Role],
    pub transport: Transport,
}

impl TransitionRule {
    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition for {entity} from `{status}` using action {action}")]
    InvalidTransition { entity: EntityType, status: String, action: Action },
}

#[derive(Clone, Debug)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
}

const STOREKEEPING: &[Role] = &[Role::Magasinier, Role::Responsable, Role::Admin];
const DELIVERY: &[Role] = &[Role::Magasinier, Role::Admin];
const FIELD_WORK: &[Role] = &[Role::Technicien, Role::Responsable, Role::Admin];
const INTERVENTION_EDIT: &[Role] = &[Role::Technicien, Role::Admin];

impl TransitionTable {
    pub fn new(rules: Vec<TransitionRule>) -> Self {
        Self { rules }
    }

    /// Process-wide table of the maintenance workflows.
    pub fn standard() -> &'static TransitionTable {
        static TABLE: OnceLock<TransitionTable> = OnceLock::new();
        TABLE.get_or_init(|| TransitionTable::new(standard_rules()))
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    pub fn rules_for(&self, entity: EntityType) -> impl Iterator<Item = &TransitionRule> {
        self.rules.iter().filter(move |rule| rule.entity == entity)
    }

    /// Looks up the rule for `(entity, current, action)`. Unmapped statuses never match.
    pub fn rule(
        &self,
        entity: EntityType,
        current: &str,
        action: Action,
    ) -> Result<&TransitionRule, TransitionError> {
        Status::parse(entity, current)
            .and_then(|from| {
                self.rules_for(entity).find(|rule| rule.from == from && rule.action == action)
            })
            .ok_or_else(|| TransitionError::InvalidTransition {
                entity,
                status: current.to_string(),
                action,
            })
    }

    pub fn next_status(
        &self,
        entity: EntityType,
        current: &str,
        action: Action,
    ) -> Result<Status, TransitionError> {
        self.rule(entity, current, action).map(|rule| rule.to)
    }

    pub fn allowed_actions(
        &self,
        entity: EntityType,
        current: &str,
        role: Role,
    ) -> BTreeSet<Action> {
        let Some(from) = Status::parse(entity, current) else {
            return BTreeSet::new();
        };
        self.rules_for(entity)
            .filter(|rule| rule.from == from && rule.permits(role))
            .map(|rule| rule.action)
            .collect()
    }

    /// A declared status with no outgoing rule.
    pub fn is_terminal(&self, entity: EntityType, status: Status) -> bool {
        !self.rules_for(entity).any(|rule| rule.from == status)
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new(standard_rules())
    }
}

pub fn allowed_actions(entity: EntityType, current: &str, role: Role) -> BTreeSet<Action> {
    TransitionTable::standard().allowed_actions(entity, current, role)
}

pub fn next_status(
    entity: EntityType,
    current: &str,
    action: Action,
) -> Result<Status, TransitionError> {
    TransitionTable::standard().next_status(entity, current, action)
}

fn standard_rules() -> Vec<TransitionRule> {
    use Action::{
        Completer, Confirmer, Demarrer, Livrer, Rejeter, Reporter, Reprendre, Resoudre, Terminer,
        Valider,
    };
    use EntityType::{Commande, Demande, Intervention, Maintenance, Panne};
    use Status::{
        Complete, EnAttente, EnCours, Livree, Ouverte, Planifiee, Rejetee, Reporte, Resolue,
        Terminee, Validee,
    };
    use Transport::{ActionRoute, StatusField};

    let rule = |entity, from, action, to, roles: &'static [Role], transport| TransitionRule {
        entity,
        from,
        action,
        to,
        roles,
        transport,
    };

    vec![
        rule(Commande, EnAttente, Valider, Validee, STOREKEEPING, ActionRoute),
        rule(Commande, Validee, Livrer, Livree, DELIVERY, ActionRoute),
        rule(Panne, Ouverte, Confirmer, EnCours, FIELD_WORK, ActionRoute),
        rule(Panne, EnCours, Resoudre, Resolue, FIELD_WORK, ActionRoute),
        rule(Demande, EnAttente, Valider, Validee, STOREKEEPING, ActionRoute),
        rule(Demande, EnAttente, Rejeter, Rejetee, STOREKEEPING, ActionRoute),
        rule(Intervention, EnCours, Completer, Complete, INTERVENTION_EDIT, StatusField),
        rule(Intervention, EnCours, Reporter, Reporte, INTERVENTION_EDIT, StatusField),
        rule(Intervention, Reporte, Reprendre, EnCours, INTERVENTION_EDIT, StatusField),
        rule(Intervention, Reporte, Completer, Complete, INTERVENTION_EDIT, StatusField),
        rule(Intervention, Complete, Reprendre, EnCours, INTERVENTION_EDIT, StatusField),
        rule(Intervention, Complete, Reporter, Reporte, INTERVENTION_EDIT, StatusField),
        rule(Maintenance, Planifiee, Demarrer, EnCours, FIELD_WORK, StatusField),
        rule(Maintenance, EnCours, Terminer, Terminee, FIELD_WORK, StatusField),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{allowed_actions, next_status, TransitionError, TransitionTable, Transport};
    use crate::domain::Role;
    use crate::workflow::states::{Action, EntityType, Status};

    #[test]
    fn pairs_missing_from_the_table_are_rejected() {
        let table = TransitionTable::standard();
        for entity in EntityType::ALL {
            for status in entity.statuses() {
                for action in Action::ALL {
                    let declared = table
                        .rules()
                        .iter()
                        .any(|rule| rule.entity == entity && rule.from == *status && rule.action == action);
                    let result = table.next_status(entity, status.label(), action);
                    assert_eq!(result.is_ok(), declared, "{entity} {status} {action}");
                    if !declared {
                        assert!(matches!(result, Err(TransitionError::InvalidTransition { .. })));
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_statuses_allow_nothing_for_any_role() {
        let terminals = [
            (EntityType::Commande, Status::Livree),
            (EntityType::Panne, Status::Resolue),
            (EntityType::Demande, Status::Validee),
            (EntityType::Demande, Status::Rejetee),
            (EntityType::Maintenance, Status::Terminee),
        ];
        for (entity, status) in terminals {
            assert!(TransitionTable::standard().is_terminal(entity, status));
            for role in Role::ALL {
                assert!(allowed_actions(entity, status.label(), role).is_empty());
            }
        }
    }

    #[test]
    fn every_rule_targets_a_declared_status() {
        for rule in TransitionTable::standard().rules() {
            assert!(rule.entity.statuses().contains(&rule.from));
            assert!(rule.entity.statuses().contains(&rule.to));
            assert!(!rule.roles.is_empty());
        }
    }

    #[test]
    fn storekeeper_can_validate_pending_order() {
        let actions = allowed_actions(EntityType::Commande, "En attente", Role::Magasinier);
        assert_eq!(actions, BTreeSet::from([Action::Valider]));
        assert_eq!(
            next_status(EntityType::Commande, "En attente", Action::Valider),
            Ok(Status::Validee)
        );
    }

    #[test]
    fn orders_only_move_forward() {
        assert!(next_status(EntityType::Commande, "Validée", Action::Valider).is_err());
        assert!(next_status(EntityType::Commande, "En attente", Action::Livrer).is_err());
        assert_eq!(
            next_status(EntityType::Commande, "Validée", Action::Livrer),
            Ok(Status::Livree)
        );
    }

    #[test]
    fn pending_part_request_can_be_validated_or_rejected() {
        let actions = allowed_actions(EntityType::Demande, "En attente", Role::Responsable);
        assert_eq!(actions, BTreeSet::from([Action::Valider, Action::Rejeter]));
        assert!(allowed_actions(EntityType::Demande, "En attente", Role::Technicien).is_empty());
    }

    #[test]
    fn fault_reports_progress_through_confirm_then_resolve() {
        let table = TransitionTable::standard();
        let in_progress =
            table.next_status(EntityType::Panne, "Ouverte", Action::Confirmer).expect("confirm");
        let resolved = table
            .next_status(EntityType::Panne, in_progress.label(), Action::Resoudre)
            .expect("resolve");
        assert_eq!(resolved, Status::Resolue);
        assert!(allowed_actions(EntityType::Panne, "Ouverte", Role::Operateur).is_empty());
    }

    #[test]
    fn interventions_are_freely_editable_by_technicians() {
        let table = TransitionTable::standard();
        for status in EntityType::Intervention.statuses() {
            let actions = table.allowed_actions(EntityType::Intervention, status.label(), Role::Technicien);
            assert_eq!(actions.len(), 2, "{status}");
            assert!(!table.is_terminal(EntityType::Intervention, *status));
        }
        assert!(allowed_actions(EntityType::Intervention, "En cours", Role::Magasinier).is_empty());
        let rule = table
            .rule(EntityType::Intervention, "Reporté", Action::Reprendre)
            .expect("reprendre");
        assert_eq!(rule.transport, Transport::StatusField);
    }

    #[test]
    fn unmapped_statuses_allow_nothing_and_never_panic() {
        for role in Role::ALL {
            assert!(allowed_actions(EntityType::Commande, "Archivée", role).is_empty());
        }
        let error = next_status(EntityType::Commande, "Archivée", Action::Valider)
            .expect_err("unmapped status");
        assert_eq!(
            error,
            TransitionError::InvalidTransition {
                entity: EntityType::Commande,
                status: "Archivée".to_string(),
                action: Action::Valider,
            }
        );
    }

    #[test]
    fn machines_and_parts_have_no_workflow_actions() {
        for entity in [EntityType::Machine, EntityType::Piece] {
            for status in entity.statuses() {
                assert!(allowed_actions(entity, status.label(), Role::Admin).is_empty());
            }
        }
    }
}
