//! Tests for route paths and recognition.

#[cfg(test)]
mod tests {
    use crate::routes::MainRoute;
    use strum::IntoEnumIterator;
    use yew_router::Routable;

    #[test]
    fn route_paths() {
        assert_eq!(MainRoute::Chat.to_path(), "/");
        assert_eq!(MainRoute::Login.to_path(), "/login");
        assert_eq!(MainRoute::Admin.to_path(), "/admin");
        assert_eq!(MainRoute::NotFound.to_path(), "/404");
    }

    #[test]
    fn recognizes_known_paths() {
        assert_eq!(MainRoute::recognize("/login"), Some(MainRoute::Login));
        assert_eq!(MainRoute::recognize("/admin"), Some(MainRoute::Admin));
    }

    #[test]
    fn unknown_path_falls_back_to_not_found() {
        assert_eq!(MainRoute::recognize("/missing"), Some(MainRoute::NotFound));
    }

    #[test]
    fn every_route_round_trips() {
        for route in MainRoute::iter() {
            let path = route.to_path();
            assert_eq!(MainRoute::recognize(&path), Some(route));
        }
    }
}
