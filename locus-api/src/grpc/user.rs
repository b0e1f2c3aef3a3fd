//! User service: account storage over gRPC.

use locus_core::Pagination;
use tonic::{Request, Response, Status};

use crate::accounts::UserAccounts;
use crate::proto::user::{
    user_service_server::UserService, CreateUserRequest, CreateUserResponse, GetProfileRequest,
    GetProfileResponse, ListUsersRequest, ListUsersResponse,
};

pub struct UserGrpcService {
    accounts: UserAccounts,
}

impl UserGrpcService {
    pub fn new(accounts: UserAccounts) -> Self {
        Self { accounts }
    }
}

#[tonic::async_trait]
impl UserService for UserGrpcService {
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let req = request.into_inner();
        let profile = self.accounts.create_user(&req.email, &req.password).await?;
        Ok(Response::new(CreateUserResponse {
            user: Some(profile.into()),
        }))
    }

    async fn get_profile(
        &self,
        request: Request<GetProfileRequest>,
    ) -> Result<Response<GetProfileResponse>, Status> {
        let req = request.into_inner();
        if req.email.is_empty() {
            return Err(Status::invalid_argument("email is required"));
        }

        let profile = self
            .accounts
            .get_profile(&req.email, req.password.as_deref())
            .await?;
        Ok(Response::new(GetProfileResponse {
            user: Some(profile.into()),
        }))
    }

    async fn list_users(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let req = request.into_inner();
        let page = Pagination::new(Some(req.page), Some(req.per_page));

        let result = self.accounts.list_users(page).await?;
        Ok(Response::new(ListUsersResponse {
            users: result.users.into_iter().map(Into::into).collect(),
            total: result.total,
        }))
    }
}
