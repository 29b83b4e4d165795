//! Route table.
//!
//! Each HTTP operation is declared once with the access it requires and the inputs
//! its handler validates; the router is assembled from this table.

use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};

use crate::handlers;
use crate::middleware::auth_middleware;
use crate::startup::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Bearer,
}

/// A validated request input: where it is read from and the shape it must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Path segment that must be an identifier.
    PathId(&'static str),
    /// Identifier taken from the verified token subject.
    TokenSubject,
    /// Body field that must be an identifier.
    BodyId(&'static str),
    /// The whole body is the identifier, bare or as `{ "id": .. }`.
    BodyIdentifier,
    /// Body field that must be a non-empty string.
    BodyString(&'static str),
    /// Body field that must be a boolean.
    BodyBool(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRoles,
    ListUserRoles,
    ListOrganizationRoles,
    GetRole,
    CreateRole,
    UpdateRole,
    DeleteRole,
    ListRsvps,
    ListUserRsvps,
    ListEventRsvps,
    GetRsvp,
    GetRsvpReservedSegment,
    GetUserEventRsvp,
    CreateRsvp,
    UpdateRsvp,
    DeleteRsvp,
    DeleteUserEventRsvps,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::CreateRole | Operation::CreateRsvp => Method::POST,
            Operation::UpdateRole | Operation::UpdateRsvp => Method::PUT,
            Operation::DeleteRole | Operation::DeleteRsvp | Operation::DeleteUserEventRsvps => {
                Method::DELETE
            }
            _ => Method::GET,
        }
    }

    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            Operation::ListRoles => get(handlers::role::list_roles),
            Operation::ListUserRoles => get(handlers::role::list_user_roles),
            Operation::ListOrganizationRoles => get(handlers::role::list_organization_roles),
            Operation::GetRole => get(handlers::role::get_role),
            Operation::CreateRole => post(handlers::role::create_role),
            Operation::UpdateRole => put(handlers::role::update_role),
            Operation::DeleteRole => delete(handlers::role::delete_role),
            Operation::ListRsvps => get(handlers::rsvp::list_rsvps),
            Operation::ListUserRsvps => get(handlers::rsvp::list_user_rsvps),
            Operation::ListEventRsvps => get(handlers::rsvp::list_event_rsvps),
            Operation::GetRsvp => get(handlers::rsvp::get_rsvp),
            Operation::GetRsvpReservedSegment => get(handlers::rsvp::get_rsvp_reserved_segment),
            Operation::GetUserEventRsvp => get(handlers::rsvp::get_user_event_rsvp),
            Operation::CreateRsvp => post(handlers::rsvp::create_rsvp),
            Operation::UpdateRsvp => put(handlers::rsvp::update_rsvp),
            Operation::DeleteRsvp => delete(handlers::rsvp::delete_rsvp),
            Operation::DeleteUserEventRsvps => delete(handlers::rsvp::delete_user_event_rsvps),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub operation: Operation,
    pub path: &'static str,
    pub access: Access,
    pub inputs: &'static [Input],
}

const ROLE_ROUTES: [RouteSpec; 7] = [
    RouteSpec {
        operation: Operation::ListRoles,
        path: "/role/all",
        access: Access::Bearer,
        inputs: &[],
    },
    RouteSpec {
        operation: Operation::ListUserRoles,
        path: "/role/user",
        access: Access::Bearer,
        inputs: &[Input::TokenSubject],
    },
    RouteSpec {
        operation: Operation::ListOrganizationRoles,
        path: "/role/org/:id",
        access: Access::Bearer,
        inputs: &[Input::PathId("id")],
    },
    RouteSpec {
        operation: Operation::GetRole,
        path: "/role/:id",
        access: Access::Bearer,
        inputs: &[Input::PathId("id")],
    },
    RouteSpec {
        operation: Operation::CreateRole,
        path: "/role/",
        access: Access::Bearer,
        inputs: &[
            Input::BodyId("userId"),
            Input::BodyId("orgId"),
            Input::BodyString("role"),
        ],
    },
    RouteSpec {
        operation: Operation::UpdateRole,
        path: "/role/",
        access: Access::Bearer,
        inputs: &[Input::BodyId("roleId"), Input::BodyString("role")],
    },
    RouteSpec {
        operation: Operation::DeleteRole,
        path: "/role/",
        access: Access::Bearer,
        inputs: &[Input::BodyIdentifier],
    },
];

// Path parameters sharing a position must share a name, hence `:id` for the user
// segment of the compound-key route.
const RSVP_ROUTES: [RouteSpec; 10] = [
    RouteSpec {
        operation: Operation::ListRsvps,
        path: "/rsvp/all",
        access: Access::Public,
        inputs: &[],
    },
    RouteSpec {
        operation: Operation::ListUserRsvps,
        path: "/rsvp/user/:user_id",
        access: Access::Public,
        inputs: &[Input::PathId("user_id")],
    },
    RouteSpec {
        operation: Operation::ListEventRsvps,
        path: "/rsvp/event/:event_id",
        access: Access::Public,
        inputs: &[Input::PathId("event_id")],
    },
    RouteSpec {
        operation: Operation::GetRsvp,
        path: "/rsvp/:id",
        access: Access::Public,
        inputs: &[Input::PathId("id")],
    },
    // The static `/rsvp/user` segment shadows `/rsvp/:id` for GET; it is a lookup
    // by the identifier "user" and fails validation.
    RouteSpec {
        operation: Operation::GetRsvpReservedSegment,
        path: "/rsvp/user",
        access: Access::Public,
        inputs: &[Input::PathId("id")],
    },
    RouteSpec {
        operation: Operation::GetUserEventRsvp,
        path: "/rsvp/:id/:event_id",
        access: Access::Public,
        inputs: &[Input::PathId("id"), Input::PathId("event_id")],
    },
    RouteSpec {
        operation: Operation::CreateRsvp,
        path: "/rsvp/",
        access: Access::Public,
        inputs: &[Input::BodyId("userId"), Input::BodyId("eventId")],
    },
    RouteSpec {
        operation: Operation::UpdateRsvp,
        path: "/rsvp/",
        access: Access::Public,
        inputs: &[Input::BodyId("rsvpId"), Input::BodyBool("rsvp")],
    },
    RouteSpec {
        operation: Operation::DeleteRsvp,
        path: "/rsvp/",
        access: Access::Public,
        inputs: &[Input::BodyIdentifier],
    },
    RouteSpec {
        operation: Operation::DeleteUserEventRsvps,
        path: "/rsvp/user",
        access: Access::Public,
        inputs: &[Input::BodyId("userId"), Input::BodyId("eventId")],
    },
];

/// Every API route. Role routes always require a bearer token; rsvp routes use `rsvp_access`.
pub fn route_table(rsvp_access: Access) -> Vec<RouteSpec> {
    ROLE_ROUTES
        .iter()
        .copied()
        .chain(RSVP_ROUTES.iter().map(|spec| RouteSpec {
            access: rsvp_access,
            ..*spec
        }))
        .collect()
}

/// Build a router from route specs. Paths ending in `/` are also served without it.
pub fn mount(routes: &[RouteSpec], state: &AppState) -> Router<AppState> {
    routes.iter().fold(Router::new(), |router, spec| {
        let mut method_router = spec.operation.method_router();
        if spec.access == Access::Bearer {
            method_router =
                method_router.route_layer(from_fn_with_state(state.clone(), auth_middleware));
        }

        tracing::debug!(
            method = %spec.operation.method(),
            path = spec.path,
            access = ?spec.access,
            inputs = ?spec.inputs,
            "Mounting route"
        );

        let router = router.route(spec.path, method_router.clone());
        match spec.path.strip_suffix('/') {
            Some(bare) if !bare.is_empty() => router.route(bare, method_router),
            _ => router,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn role_routes_are_always_gated() {
        for access in [Access::Public, Access::Bearer] {
            let table = route_table(access);
            assert_eq!(table.len(), 17);
            assert!(table
                .iter()
                .filter(|spec| spec.path.starts_with("/role"))
                .all(|spec| spec.access == Access::Bearer));
        }
    }

    #[test]
    fn rsvp_access_follows_configuration() {
        let open = route_table(Access::Public);
        assert!(open
            .iter()
            .filter(|spec| spec.path.starts_with("/rsvp"))
            .all(|spec| spec.access == Access::Public));

        let gated = route_table(Access::Bearer);
        assert!(gated.iter().all(|spec| spec.access == Access::Bearer));
    }

    #[test]
    fn method_and_path_pairs_are_unique() {
        let table = route_table(Access::Public);
        let pairs: HashSet<_> = table
            .iter()
            .map(|spec| (spec.operation.method(), spec.path))
            .collect();
        assert_eq!(pairs.len(), table.len());
    }

    #[test]
    fn compound_key_routes_validate_both_identifiers() {
        let table = route_table(Access::Public);
        let lookup = table
            .iter()
            .find(|spec| spec.operation == Operation::GetUserEventRsvp)
            .unwrap();
        assert_eq!(lookup.inputs, &[Input::PathId("id"), Input::PathId("event_id")]);

        let removal = table
            .iter()
            .find(|spec| spec.operation == Operation::DeleteUserEventRsvps)
            .unwrap();
        assert_eq!(
            removal.inputs,
            &[Input::BodyId("userId"), Input::BodyId("eventId")]
        );
    }
}
