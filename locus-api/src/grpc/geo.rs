//! Geo service: the gRPC face of [`GeoEngine`].

use tonic::{Request, Response, Status};

use crate::context::CallContext;
use crate::geo::GeoEngine;
use crate::proto::geo::{
    geo_service_server::GeoService, GeocodeRequest, GeocodeResponse, SearchAddressRequest,
    SearchAddressResponse,
};

pub struct GeoGrpcService {
    engine: GeoEngine,
}

impl GeoGrpcService {
    pub fn new(engine: GeoEngine) -> Self {
        Self { engine }
    }
}

#[tonic::async_trait]
impl GeoService for GeoGrpcService {
    async fn search_address(
        &self,
        request: Request<SearchAddressRequest>,
    ) -> Result<Response<SearchAddressResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();

        let list = self.engine.search_address(&ctx, &req.query).await?;
        Ok(Response::new(SearchAddressResponse {
            addresses: list.addresses.into_iter().map(Into::into).collect(),
        }))
    }

    async fn geocode(
        &self,
        request: Request<GeocodeRequest>,
    ) -> Result<Response<GeocodeResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();

        let list = self.engine.geocode(&ctx, &req.address).await?;
        Ok(Response::new(GeocodeResponse {
            addresses: list.addresses.into_iter().map(Into::into).collect(),
        }))
    }
}
